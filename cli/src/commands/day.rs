use std::process;

use anyhow::Result;
use chrono::Local;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use nutrismart_core::service::NutritionService;

use super::helpers::{or_exit_empty, parse_date, truncate};

pub(crate) fn cmd_close_day(
    svc: &NutritionService,
    email: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let summary = or_exit_empty(svc.close_day(email, date), json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let date = &summary.date;
    println!("=== {date} ({}) ===\n", summary.owner_email);

    let total = summary.total_calories;
    let target = summary.target_calories;
    let meals = summary.meal_count;
    println!("  Diet:     {}", summary.diet);
    println!("  Meals:    {meals}");
    println!("  TOTAL:    {total:.2} kcal");
    println!("  TARGET:   {target:.0} kcal");
    if (summary.snapshot_calories - summary.total_calories).abs() >= 0.01 {
        let logged = summary.snapshot_calories;
        println!("  LOGGED:   {logged:.2} kcal (catalog values changed since logging)");
    }
    println!("\n  {}", summary.status.message());

    Ok(())
}

pub(crate) fn cmd_ranking(
    svc: &NutritionService,
    email: &str,
    limit: usize,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct RankRow {
        #[tabled(rename = "#")]
        rank: usize,
        #[tabled(rename = "Food")]
        food: String,
        #[tabled(rename = "Total grams")]
        grams: String,
    }

    let ranking = svc.rank_top_foods(email, limit)?;

    if ranking.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No meals logged for {email}");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(());
    }

    let rows: Vec<RankRow> = ranking
        .iter()
        .enumerate()
        .map(|(i, r)| RankRow {
            rank: i + 1,
            food: truncate(&r.food_name, 35),
            grams: format!("{:.0}", r.total_grams),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

/// Nudge the user when nothing has been logged today, and show the next
/// scheduled meal if a schedule is set.
pub(crate) fn cmd_reminders(svc: &NutritionService, email: &str, json: bool) -> Result<()> {
    let now = Local::now();
    let today = now.date_naive();
    let logged = svc.meals_logged_on(email, today)?;
    let schedule = svc.get_meal_schedule(email)?;

    let next_meal = schedule.as_ref().and_then(|s| {
        let time = now.time();
        [
            ("breakfast", s.breakfast),
            ("lunch", s.lunch),
            ("dinner", s.dinner),
        ]
        .into_iter()
        .filter(|(_, t)| *t > time)
        .min_by_key(|(_, t)| *t)
    });

    if json {
        println!(
            "{}",
            serde_json::json!({
                "date": today.format("%Y-%m-%d").to_string(),
                "meals_logged": logged,
                "needs_logging": logged == 0,
                "next_meal": next_meal.map(|(name, t)| serde_json::json!({
                    "meal": name,
                    "time": t.format("%H:%M").to_string(),
                })),
            })
        );
        return Ok(());
    }

    if logged == 0 {
        println!("You haven't logged any meals today. Don't forget to record what you eat!");
    } else {
        println!("{logged} meal(s) logged today.");
    }
    match next_meal {
        Some((name, t)) => println!("Next up: {name} at {}", t.format("%H:%M")),
        None if schedule.is_none() => {
            println!("No meal schedule set. Use `nutrismart schedule set` to add one.");
        }
        None => {}
    }

    Ok(())
}
