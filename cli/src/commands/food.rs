use std::path::Path;
use std::process;

use anyhow::{Context, Result};

use nutrismart_core::models::{Food, normalize_food_name};
use nutrismart_core::service::NutritionService;

use super::helpers::{exit_empty, print_food_table};

pub(crate) fn cmd_food_add(
    svc: &NutritionService,
    name: &str,
    calories: f64,
    json: bool,
) -> Result<()> {
    let food = svc.add_food(name, calories)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        let name = &food.name;
        let cal = food.calories_per_100g;
        println!("Added food: {name} ({cal:.1} kcal/100g)");
    }

    Ok(())
}

pub(crate) fn cmd_food_list(svc: &NutritionService, json: bool) -> Result<()> {
    let foods = svc.list_foods()?;

    if foods.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No foods in the catalog");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        let refs: Vec<&Food> = foods.iter().collect();
        print_food_table(&refs);
    }

    Ok(())
}

pub(crate) fn cmd_food_edit(
    svc: &NutritionService,
    name: &str,
    calories: f64,
    json: bool,
) -> Result<()> {
    let food = svc.update_food_calories(name, calories)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        let name = &food.name;
        let cal = food.calories_per_100g;
        println!("Updated {name}: {cal:.1} kcal/100g");
        println!("Meals already logged keep their recorded calories.");
    }

    Ok(())
}

pub(crate) fn cmd_food_delete(svc: &NutritionService, name: &str, json: bool) -> Result<()> {
    svc.delete_food(name)?;
    let name = normalize_food_name(name);

    if json {
        println!("{}", serde_json::json!({ "deleted": name }));
    } else {
        println!("Deleted {name}");
    }

    Ok(())
}

pub(crate) fn cmd_food_import(
    svc: &NutritionService,
    path: &Path,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let summary = svc
        .import_catalog_csv(file, dry_run)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    if summary.rows_parsed == 0 {
        exit_empty("No rows found in CSV file", json);
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "dry_run": dry_run,
                "rows_parsed": summary.rows_parsed,
                "foods_created": summary.foods_created,
                "foods_skipped": summary.foods_skipped,
            })
        );
    } else {
        if dry_run {
            println!("Dry run, no changes made.\n");
            println!("  Rows parsed:     {}", summary.rows_parsed);
            println!("  Foods to create: {}", summary.foods_created);
        } else {
            println!("Import complete.\n");
            println!("  Rows parsed:   {}", summary.rows_parsed);
            println!("  Foods created: {}", summary.foods_created);
        }
        println!("  Already known: {}", summary.foods_skipped);
    }

    Ok(())
}
