mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    cmd_close_day, cmd_feedback_list, cmd_feedback_submit, cmd_food_add, cmd_food_delete,
    cmd_food_edit, cmd_food_import, cmd_food_list, cmd_log, cmd_meals, cmd_ranking,
    cmd_recommend, cmd_reminders, cmd_schedule_set, cmd_schedule_show, cmd_user_edit,
    cmd_user_list, cmd_user_register, cmd_user_show,
};
use crate::config::Config;
use nutrismart_core::accounting::DEFAULT_RANKING_LIMIT;
use nutrismart_core::service::NutritionService;

#[derive(Parser)]
#[command(
    name = "nutrismart",
    version,
    about = "Diet-aware meal log and daily calorie check",
    long_about = "Log what you eat, get food ideas for your diet plan and see \
                  how each day's calories compare with your target."
)]
struct Cli {
    /// Path to the SQLite database (default: platform data directory)
    #[arg(long, global = true, env = "NUTRISMART_DB", value_name = "PATH")]
    db: Option<PathBuf>,
    /// JSON file with per-diet recommendation lists (default: builtin lists)
    #[arg(long, global = true, env = "NUTRISMART_RECOMMENDATIONS", value_name = "PATH")]
    recommendations: Option<PathBuf>,
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage user profiles
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage the food catalog
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Log a meal
    Log {
        /// Food name as it appears in the catalog
        food: String,
        /// Quantity in grams (e.g. "200" or "200g")
        quantity: String,
        /// User e-mail
        #[arg(short, long)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's logged meals, newest first
    Meals {
        /// User e-mail
        #[arg(short, long)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Total a day's calories and compare them with the diet target
    CloseDay {
        /// User e-mail
        #[arg(short, long)]
        user: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest foods that suit the user's diet
    Recommend {
        /// User e-mail
        #[arg(short, long)]
        user: String,
        /// Seed for a repeatable selection
        #[arg(long)]
        seed: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the user's most eaten foods by total grams
    Ranking {
        /// User e-mail
        #[arg(short, long)]
        user: String,
        /// Number of foods to show
        #[arg(short, long, default_value_t = DEFAULT_RANKING_LIMIT)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check whether today's meals have been logged
    Reminders {
        /// User e-mail
        #[arg(short, long)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the user's usual meal times
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Send or review feedback about the app
    Feedback {
        #[command(subcommand)]
        command: FeedbackCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a new user
    Register {
        /// User e-mail
        email: String,
        /// Diet plan: LowCarb, Ketogenic, HighProtein, Bulking
        #[arg(long)]
        diet: String,
        /// Weight in kilograms
        #[arg(long)]
        weight: f64,
        /// Height in metres
        #[arg(long)]
        height: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a user's profile
    Show {
        /// User e-mail
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change weight, height or diet (BMI is recomputed)
    Edit {
        /// User e-mail
        email: String,
        /// New weight in kilograms
        #[arg(long)]
        weight: Option<f64>,
        /// New height in metres
        #[arg(long)]
        height: Option<f64>,
        /// New diet plan
        #[arg(long)]
        diet: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all registered users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Add a food to the catalog
    Add {
        /// Food name
        name: String,
        /// Calories per 100g
        #[arg(long)]
        calories: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the catalog
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a food's calories per 100g
    Edit {
        /// Food name
        name: String,
        /// New calories per 100g
        #[arg(long)]
        calories: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a food from the catalog
    Delete {
        /// Food name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import foods from a CSV file with `name,calories_per_100g` columns
    Import {
        /// Path to the CSV file
        file: PathBuf,
        /// Preview import without making changes
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ScheduleCommands {
    /// Set breakfast, lunch and dinner times (HH:MM)
    Set {
        /// User e-mail
        #[arg(short, long)]
        user: String,
        #[arg(long, default_value = "07:00")]
        breakfast: String,
        #[arg(long, default_value = "12:00")]
        lunch: String,
        #[arg(long, default_value = "19:00")]
        dinner: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the saved meal times
    Show {
        /// User e-mail
        #[arg(short, long)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FeedbackCommands {
    /// Rate the app
    Submit {
        /// User e-mail
        #[arg(short, long)]
        user: String,
        /// Overall satisfaction, 1-5
        #[arg(long)]
        satisfaction: u8,
        /// Ease of use, 1-5
        #[arg(long)]
        ease_of_use: u8,
        /// Would recommend the app to a friend
        #[arg(long)]
        recommend: bool,
        /// Free-text comment
        #[arg(long)]
        comment: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all feedback
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .parse_env(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db, cli.recommendations)?;
    let svc = NutritionService::new(&config.db_path)?;

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Register {
                email,
                diet,
                weight,
                height,
                json,
            } => cmd_user_register(&svc, &email, &diet, weight, height, json),
            UserCommands::Show { email, json } => cmd_user_show(&svc, &email, json),
            UserCommands::Edit {
                email,
                weight,
                height,
                diet,
                json,
            } => cmd_user_edit(&svc, &email, weight, height, diet.as_deref(), json),
            UserCommands::List { json } => cmd_user_list(&svc, json),
        },
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                calories,
                json,
            } => cmd_food_add(&svc, &name, calories, json),
            FoodCommands::List { json } => cmd_food_list(&svc, json),
            FoodCommands::Edit {
                name,
                calories,
                json,
            } => cmd_food_edit(&svc, &name, calories, json),
            FoodCommands::Delete { name, json } => cmd_food_delete(&svc, &name, json),
            FoodCommands::Import {
                file,
                dry_run,
                json,
            } => cmd_food_import(&svc, &file, dry_run, json),
        },
        Commands::Log {
            food,
            quantity,
            user,
            json,
        } => cmd_log(&svc, &user, &food, &quantity, json),
        Commands::Meals { user, json } => cmd_meals(&svc, &user, json),
        Commands::CloseDay { user, date, json } => cmd_close_day(&svc, &user, date, json),
        Commands::Recommend { user, seed, json } => {
            let source = config.recommendation_source()?;
            cmd_recommend(&svc, source.as_ref(), &user, seed, json)
        }
        Commands::Ranking { user, limit, json } => cmd_ranking(&svc, &user, limit, json),
        Commands::Reminders { user, json } => cmd_reminders(&svc, &user, json),
        Commands::Schedule { command } => match command {
            ScheduleCommands::Set {
                user,
                breakfast,
                lunch,
                dinner,
                json,
            } => cmd_schedule_set(&svc, &user, &breakfast, &lunch, &dinner, json),
            ScheduleCommands::Show { user, json } => cmd_schedule_show(&svc, &user, json),
        },
        Commands::Feedback { command } => match command {
            FeedbackCommands::Submit {
                user,
                satisfaction,
                ease_of_use,
                recommend,
                comment,
                json,
            } => cmd_feedback_submit(
                &svc,
                &user,
                satisfaction,
                ease_of_use,
                recommend,
                comment,
                json,
            ),
            FeedbackCommands::List { json } => cmd_feedback_list(&svc, json),
        },
    }
}
