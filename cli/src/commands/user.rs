use std::process;

use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use nutrismart_core::models::{NewUserProfile, UserProfile};
use nutrismart_core::service::NutritionService;

use super::helpers::{parse_diet, truncate};

pub(crate) fn cmd_user_register(
    svc: &NutritionService,
    email: &str,
    diet: &str,
    weight_kg: f64,
    height_m: f64,
    json: bool,
) -> Result<()> {
    let diet = parse_diet(diet)?;
    let profile = svc.register_user(&NewUserProfile::new(email, diet, weight_kg, height_m))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Registered {}", profile.email);
        print_profile(&profile);
    }

    Ok(())
}

pub(crate) fn cmd_user_show(svc: &NutritionService, email: &str, json: bool) -> Result<()> {
    let profile = svc.get_profile(email)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("=== {} ===\n", profile.email);
        print_profile(&profile);
    }

    Ok(())
}

pub(crate) fn cmd_user_edit(
    svc: &NutritionService,
    email: &str,
    weight_kg: Option<f64>,
    height_m: Option<f64>,
    diet: Option<&str>,
    json: bool,
) -> Result<()> {
    let current = svc.get_profile(email)?;
    let diet = match diet {
        Some(d) => parse_diet(d)?,
        // A stored diet that no longer parses has to be replaced explicitly.
        None => parse_diet(&current.diet)?,
    };
    let profile = svc.update_profile(
        email,
        weight_kg.unwrap_or(current.weight_kg),
        height_m.unwrap_or(current.height_m),
        diet,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Updated {}", profile.email);
        print_profile(&profile);
    }

    Ok(())
}

pub(crate) fn cmd_user_list(svc: &NutritionService, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct UserRow {
        #[tabled(rename = "Email")]
        email: String,
        #[tabled(rename = "Diet")]
        diet: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Height")]
        height: String,
        #[tabled(rename = "BMI")]
        bmi: String,
    }

    let profiles = svc.list_profiles()?;

    if profiles.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No users registered");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    let rows: Vec<UserRow> = profiles
        .iter()
        .map(|p| UserRow {
            email: truncate(&p.email, 35),
            diet: p.diet.clone(),
            weight: format!("{:.1} kg", p.weight_kg),
            height: format!("{:.2} m", p.height_m),
            bmi: format!("{:.2}", p.bmi),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

fn print_profile(profile: &UserProfile) {
    let diet = &profile.diet;
    match profile.diet_plan() {
        Some(plan) => println!("  Diet:   {diet} ({})", plan.description()),
        None => println!("  Diet:   {diet} (not recognized)"),
    }
    println!("  Weight: {:.1} kg", profile.weight_kg);
    println!("  Height: {:.2} m", profile.height_m);
    println!(
        "  BMI:    {:.2} ({})",
        profile.bmi,
        profile.bmi_category().label()
    );
}
