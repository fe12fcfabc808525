use std::process;

use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use nutrismart_core::models::NewFeedback;
use nutrismart_core::service::NutritionService;

use super::helpers::truncate;

pub(crate) fn cmd_feedback_submit(
    svc: &NutritionService,
    email: &str,
    satisfaction: u8,
    ease_of_use: u8,
    would_recommend: bool,
    comment: Option<String>,
    json: bool,
) -> Result<()> {
    let feedback = svc.submit_feedback(&NewFeedback {
        owner_email: email.to_string(),
        satisfaction,
        ease_of_use,
        would_recommend,
        comment: comment.unwrap_or_default(),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&feedback)?);
    } else {
        println!("Thanks for your feedback!");
    }

    Ok(())
}

pub(crate) fn cmd_feedback_list(svc: &NutritionService, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct FeedbackRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "User")]
        user: String,
        #[tabled(rename = "Satisfaction")]
        satisfaction: u8,
        #[tabled(rename = "Ease of use")]
        ease_of_use: u8,
        #[tabled(rename = "Recommend")]
        recommend: &'static str,
        #[tabled(rename = "Comment")]
        comment: String,
    }

    let items = svc.list_feedback()?;

    if items.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No feedback yet");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let rows: Vec<FeedbackRow> = items
        .iter()
        .map(|f| FeedbackRow {
            id: f.id,
            user: truncate(&f.owner_email, 30),
            satisfaction: f.satisfaction,
            ease_of_use: f.ease_of_use,
            recommend: if f.would_recommend { "yes" } else { "no" },
            comment: truncate(&f.comment, 40),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
