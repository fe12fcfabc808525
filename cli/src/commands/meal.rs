use std::process;

use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use nutrismart_core::service::NutritionService;

use super::helpers::{parse_grams, truncate};

pub(crate) fn cmd_log(
    svc: &NutritionService,
    email: &str,
    food: &str,
    quantity: &str,
    json: bool,
) -> Result<()> {
    let grams = parse_grams(quantity)?;
    let event = svc.record_meal(email, food, grams)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else {
        let name = &event.food_name;
        let cal = event.calories;
        println!("Logged {grams:.0}g of {name} ({cal:.0} kcal)");
    }

    Ok(())
}

pub(crate) fn cmd_meals(svc: &NutritionService, email: &str, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Food")]
        food: String,
        #[tabled(rename = "Grams")]
        grams: String,
        #[tabled(rename = "Calories")]
        calories: String,
    }

    let events = svc.list_meals(email)?;

    if events.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No meals logged for {email}");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    let rows: Vec<MealRow> = events
        .iter()
        .map(|e| MealRow {
            date: e.date.clone(),
            // logged_at is RFC 3339: "YYYY-MM-DDTHH:MM:SS..."
            time: e.logged_at.get(11..16).unwrap_or("").to_string(),
            food: truncate(&e.food_name, 30),
            grams: format!("{:.0}", e.quantity_grams),
            calories: format!("{:.0}", e.calories),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
