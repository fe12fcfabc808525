use anyhow::Result;

use nutrismart_core::models::MealSchedule;
use nutrismart_core::service::NutritionService;

use super::helpers::exit_empty;

pub(crate) fn cmd_schedule_set(
    svc: &NutritionService,
    email: &str,
    breakfast: &str,
    lunch: &str,
    dinner: &str,
    json: bool,
) -> Result<()> {
    let schedule = svc.set_meal_schedule(email, breakfast, lunch, dinner)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    } else {
        println!("Meal schedule saved for {email}");
        print_schedule(&schedule);
    }

    Ok(())
}

pub(crate) fn cmd_schedule_show(svc: &NutritionService, email: &str, json: bool) -> Result<()> {
    let Some(schedule) = svc.get_meal_schedule(email)? else {
        exit_empty(&format!("No meal schedule set for {email}"), json);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    } else {
        print_schedule(&schedule);
    }

    Ok(())
}

fn print_schedule(schedule: &MealSchedule) {
    println!("  Breakfast: {}", schedule.breakfast.format("%H:%M"));
    println!("  Lunch:     {}", schedule.lunch.format("%H:%M"));
    println!("  Dinner:    {}", schedule.dinner.format("%H:%M"));
}
