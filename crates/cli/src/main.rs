//! Workout Adherence Coach CLI
//!
//! A command-line tool for managing profiles, logging workouts and requesting
//! coaching from the coaching service, plus offline data generation.

mod client;
mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use coach_lib::{NewProfile, NewWorkout};
use commands::{checkin, coaching, offline, users, workouts};

/// Workout Adherence Coach CLI
#[derive(Parser)]
#[command(name = "coach")]
#[command(author, version, about = "CLI for the Workout Adherence Coach", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via COACH_API_URL env var)
    #[arg(long, env = "COACH_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or show user profiles
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// List registered users
    Users,

    /// Show workout statistics for a user
    Stats {
        /// User ID
        user_id: String,
    },

    /// Log workouts and view history
    #[command(subcommand)]
    Workout(WorkoutCommands),

    /// Request coaching for today
    Coach {
        /// User ID
        user_id: String,

        /// How the user feels today (1-5)
        #[arg(long, short)]
        condition: u8,
    },

    /// Tell the coach how today went in your own words
    Checkin {
        /// User ID
        user_id: String,

        /// Message; without one, read messages from stdin until "quit"
        text: Vec<String>,

        /// Date for any logged workout (defaults to today on the server)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Run profile, stats and coaching against several users
    Exercise {
        /// User IDs to walk through
        #[arg(required = true)]
        user_ids: Vec<String>,
    },

    /// Generate a synthetic user table
    Seed {
        /// Output file
        #[arg(long, short, default_value = "data/users.json")]
        output: PathBuf,

        /// Number of users
        #[arg(long, default_value = "50")]
        users: usize,

        /// Days of history per user
        #[arg(long, default_value = "60")]
        days: usize,

        /// Last generated day (defaults to today)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Build a JSON Lines training set from a user table
    Dataset {
        /// User table to read
        #[arg(long, short, default_value = "data/users.json")]
        input: PathBuf,

        /// Output file
        #[arg(long, short, default_value = "data/training.jsonl")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create or replace a profile
    Create {
        /// User ID
        user_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        age: u32,

        /// e.g. stamina, weight_loss, strength
        #[arg(long)]
        goal: String,

        /// encouraging, challenging, analytical or friendly
        #[arg(long, default_value = "encouraging")]
        personality: String,
    },

    /// Show a profile
    Show {
        /// User ID
        user_id: String,
    },
}

#[derive(Subcommand)]
pub enum WorkoutCommands {
    /// Record one day's workout
    Log {
        /// User ID
        user_id: String,

        /// Mark the workout as missed
        #[arg(long)]
        missed: bool,

        /// Difficulty (1-5)
        #[arg(long, short)]
        difficulty: u8,

        /// Duration in minutes
        #[arg(long, short = 'm', default_value = "30")]
        minutes: u32,

        /// Condition score (1-5)
        #[arg(long, short)]
        condition: u8,

        /// Workout date (defaults to today on the server)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show recent workouts
    History {
        /// User ID
        user_id: String,

        /// Number of most recent records to show
        #[arg(long, short)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load()?;
    let api_url = config.api_url(cli.api_url.clone());
    let format = config.format(cli.format);

    if cli.verbose {
        output::print_info(&format!("Using API endpoint: {}", api_url));
    }

    let connect = || client::ApiClient::new(&api_url);

    match cli.command {
        Commands::Profile(cmd) => match cmd {
            ProfileCommands::Create {
                user_id,
                name,
                age,
                goal,
                personality,
            } => {
                let profile = NewProfile {
                    name,
                    age,
                    workout_goal: goal,
                    personality_type: personality,
                };
                users::create_profile(&connect()?, &user_id, profile, format).await
            }
            ProfileCommands::Show { user_id } => {
                users::show_profile(&connect()?, &user_id, format).await
            }
        },
        Commands::Users => users::list_users(&connect()?, format).await,
        Commands::Stats { user_id } => users::show_stats(&connect()?, &user_id, format).await,
        Commands::Workout(cmd) => match cmd {
            WorkoutCommands::Log {
                user_id,
                missed,
                difficulty,
                minutes,
                condition,
                date,
            } => {
                let workout = NewWorkout {
                    workout_completed: !missed,
                    difficulty,
                    duration_minutes: minutes,
                    condition_score: condition,
                    date,
                };
                workouts::log_workout(&connect()?, &user_id, workout, format).await
            }
            WorkoutCommands::History { user_id, limit } => {
                workouts::show_history(&connect()?, &user_id, limit, format).await
            }
        },
        Commands::Coach { user_id, condition } => {
            coaching::request_coaching(&connect()?, &user_id, condition, format).await
        }
        Commands::Checkin {
            user_id,
            text,
            date,
        } => {
            let text = (!text.is_empty()).then(|| text.join(" "));
            checkin::check_in(&connect()?, &user_id, text, date, format).await
        }
        Commands::Exercise { user_ids } => {
            coaching::exercise(&connect()?, &user_ids, format).await
        }
        // Offline commands never touch the API
        Commands::Seed {
            output,
            users,
            days,
            end_date,
            seed,
        } => offline::seed(&output, users, days, end_date, seed, format).await,
        Commands::Dataset { input, output } => offline::dataset(&input, &output, format).await,
    }
}
