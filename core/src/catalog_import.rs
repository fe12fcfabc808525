use std::collections::HashSet;
use std::io::Read;

use crate::db::Database;
use crate::error::{NutritionError, Result};
use crate::models::{NewFood, normalize_food_name, validate_new_food};

/// A single row parsed from a catalog CSV.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    /// 1-based line in the source file, header included.
    pub line: usize,
    pub name: String,
    pub calories_per_100g: f64,
}

/// Summary of what a catalog import would do / did.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ImportSummary {
    pub rows_parsed: usize,
    pub foods_created: usize,
    pub foods_skipped: usize,
}

/// Parse a food catalog CSV from any reader.
///
/// Expected header: `name,calories_per_100g` (case-insensitive, extra columns ignored).
pub fn parse_catalog_csv<R: Read>(reader: R) -> Result<Vec<CatalogRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let col = |name: &str| -> Option<usize> {
        headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    };

    let idx_name = col("name")
        .ok_or_else(|| NutritionError::Validation("Missing required column: name".to_string()))?;
    let idx_cal = col("calories_per_100g").ok_or_else(|| {
        NutritionError::Validation("Missing required column: calories_per_100g".to_string())
    })?;

    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let line = record
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .unwrap_or(0);

        let name = record.get(idx_name).unwrap_or("").trim().to_string();
        let raw_cal = record.get(idx_cal).unwrap_or("").trim();

        if name.is_empty() && raw_cal.is_empty() {
            continue; // blank row
        }

        let calories_per_100g = raw_cal.parse::<f64>().map_err(|_| {
            NutritionError::Validation(format!("Line {line}: invalid calories '{raw_cal}'"))
        })?;

        let food = NewFood {
            name,
            calories_per_100g,
        };
        validate_new_food(&food)
            .map_err(|e| NutritionError::Validation(format!("Line {line}: {e}")))?;

        rows.push(CatalogRow {
            line,
            name: food.name,
            calories_per_100g,
        });
    }

    Ok(rows)
}

/// Add parsed rows to the catalog. Names already present, or repeated
/// earlier in the file, are skipped. With `dry_run` nothing is written.
pub fn import_catalog(db: &Database, rows: &[CatalogRow], dry_run: bool) -> Result<ImportSummary> {
    let mut summary = ImportSummary {
        rows_parsed: rows.len(),
        ..ImportSummary::default()
    };
    let mut seen: HashSet<String> = HashSet::new();

    for row in rows {
        let key = normalize_food_name(&row.name);
        if !seen.insert(key.clone()) || db.get_food(&key)?.is_some() {
            log::warn!("Line {}: '{key}' already in catalog, skipping", row.line);
            summary.foods_skipped += 1;
            continue;
        }

        if !dry_run {
            db.insert_food(&NewFood {
                name: key,
                calories_per_100g: row.calories_per_100g,
            })?;
        }
        summary.foods_created += 1;
    }

    log::info!(
        "Catalog import{}: {} rows, {} created, {} skipped",
        if dry_run { " (dry run)" } else { "" },
        summary.rows_parsed,
        summary.foods_created,
        summary.foods_skipped
    );
    Ok(summary)
}
