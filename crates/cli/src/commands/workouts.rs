//! Workout logging commands

use anyhow::Result;
use coach_lib::NewWorkout;
use tabled::Tabled;

use crate::client::{ApiClient, WorkoutHistory, WorkoutRecorded};
use crate::output::{color_outcome, print_json, print_success, print_table, OutputFormat};

#[derive(Tabled)]
struct WorkoutRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Difficulty")]
    difficulty: u8,
    #[tabled(rename = "Minutes")]
    duration_minutes: u32,
    #[tabled(rename = "Condition")]
    condition_score: u8,
}

pub async fn log_workout(
    client: &ApiClient,
    user_id: &str,
    workout: NewWorkout,
    format: OutputFormat,
) -> Result<()> {
    workout.validate()?;
    let recorded: WorkoutRecorded = client
        .post(&["users", user_id, "workouts"], &workout)
        .await?;

    match format {
        OutputFormat::Json => print_json(&recorded)?,
        OutputFormat::Table => {
            print_success(&recorded.message);
            println!(
                "  {} | difficulty {} | {} min | {} records total",
                recorded.date,
                recorded.difficulty,
                recorded.duration_minutes,
                recorded.total_records
            );
        }
    }
    Ok(())
}

pub async fn show_history(
    client: &ApiClient,
    user_id: &str,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let mut url = client.url(&["users", user_id, "workouts"])?;
    if let Some(n) = limit {
        url.query_pairs_mut().append_pair("limit", &n.to_string());
    }
    let history: WorkoutHistory = client.get_url(url).await?;

    match format {
        OutputFormat::Json => print_json(&history)?,
        OutputFormat::Table => {
            let shown = history.recent_records.len();
            let rows: Vec<WorkoutRow> = history
                .recent_records
                .into_iter()
                .map(|log| WorkoutRow {
                    date: log.date.to_string(),
                    result: color_outcome(log.workout_completed),
                    difficulty: log.difficulty,
                    duration_minutes: log.duration_minutes,
                    condition_score: log.condition_score,
                })
                .collect();
            print_table(rows, "No workouts recorded");
            println!("\nShowing {} of {} records", shown, history.total_records);
        }
    }
    Ok(())
}
