//! Profile, user listing and statistics commands

use anyhow::Result;
use coach_lib::{stats::UserStats, NewProfile, UserProfile};
use tabled::Tabled;

use crate::client::{ApiClient, ProfileCreated, UserList};
use crate::output::{
    print_field, print_json, print_success, print_table, print_warning, OutputFormat,
};

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Logs")]
    total_logs: usize,
    #[tabled(rename = "Last workout")]
    last_workout: String,
}

pub async fn create_profile(
    client: &ApiClient,
    user_id: &str,
    profile: NewProfile,
    format: OutputFormat,
) -> Result<()> {
    // Catch obvious mistakes before the round trip
    profile.validate()?;
    let created: ProfileCreated = client
        .post(&["users", user_id, "profile"], &profile)
        .await?;

    match format {
        OutputFormat::Json => print_json(&created)?,
        OutputFormat::Table => {
            print_success(&created.message);
            print_profile(&created.profile);
        }
    }
    Ok(())
}

pub async fn show_profile(client: &ApiClient, user_id: &str, format: OutputFormat) -> Result<()> {
    let profile = fetch_profile(client, user_id).await?;
    match format {
        OutputFormat::Json => print_json(&profile)?,
        OutputFormat::Table => print_profile(&profile),
    }
    Ok(())
}

pub(crate) async fn fetch_profile(client: &ApiClient, user_id: &str) -> Result<UserProfile> {
    client.get(&["users", user_id, "profile"]).await
}

pub(crate) fn print_profile(profile: &UserProfile) {
    println!("Profile {}", profile.user_id);
    print_field("Name", &profile.name);
    print_field("Age", profile.age);
    print_field("Goal", &profile.workout_goal);
    print_field("Personality", &profile.personality_type);
}

pub async fn list_users(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let list: UserList = client.get(&["users"]).await?;

    match format {
        OutputFormat::Json => print_json(&list)?,
        OutputFormat::Table => {
            let rows: Vec<UserRow> = list
                .users
                .into_iter()
                .map(|u| UserRow {
                    user_id: u.user_id,
                    name: u.name,
                    total_logs: u.total_logs,
                    last_workout: u
                        .last_workout
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            print_table(rows, "No users registered");
            println!("\nTotal: {} users", list.total);
        }
    }
    Ok(())
}

pub async fn show_stats(client: &ApiClient, user_id: &str, format: OutputFormat) -> Result<()> {
    let stats = fetch_stats(client, user_id).await?;
    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Table => print_stats(&stats),
    }
    Ok(())
}

pub(crate) async fn fetch_stats(client: &ApiClient, user_id: &str) -> Result<UserStats> {
    client.get(&["users", user_id, "stats"]).await
}

pub(crate) fn print_stats(stats: &UserStats) {
    println!("Statistics for {}", stats.user_name);
    if let Some(message) = &stats.message {
        print_warning(message);
        return;
    }
    print_field("Days logged", stats.total_days);
    print_field("Success rate", format!("{:.1}%", stats.total_success_rate));
    print_field(
        "Last 7 logs",
        format!(
            "{} ({:.1}%)",
            stats.recent_7_days_success, stats.recent_success_rate
        ),
    );
    print_field("Current streak", format!("{} days", stats.current_streak));
    if let Some(last) = stats.last_workout {
        print_field("Last workout", last);
    }
}
