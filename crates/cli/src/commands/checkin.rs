//! Free-text check-ins
//!
//! Each message is read for a workout outcome and today's condition. A known
//! outcome is logged, then coaching is requested for the reported condition.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use coach_lib::CheckIn;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::client::{ApiClient, CoachingResponse, WorkoutRecorded};
use crate::commands::coaching::{fetch_coaching, print_coaching};
use crate::output::{print_info, print_json, print_success, print_warning, OutputFormat};

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "bye"];

/// What happened for one check-in message
#[derive(Debug, Serialize)]
pub(crate) struct CheckInReply {
    pub check_in: CheckIn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<WorkoutRecorded>,
    pub coaching: Option<CoachingResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Answer one message, or chat over stdin until an exit word or EOF
pub async fn check_in(
    client: &ApiClient,
    user_id: &str,
    text: Option<String>,
    date: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(text) = text {
        let reply = respond(client, user_id, &text, date).await;
        return print_reply(&reply, format);
    }

    if format == OutputFormat::Table {
        print_info("Tell me how today went. Type 'quit' to stop.");
    }
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if format == OutputFormat::Table {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
            break;
        }
        let reply = respond(client, user_id, line, date).await;
        print_reply(&reply, format)?;
    }
    Ok(())
}

/// Log what the message reports, then ask for coaching.
///
/// API failures become warnings so a chat session survives them.
pub(crate) async fn respond(
    client: &ApiClient,
    user_id: &str,
    text: &str,
    date: Option<NaiveDate>,
) -> CheckInReply {
    let check_in = CheckIn::analyze(text);
    let mut warnings = Vec::new();

    let mut recorded = None;
    if let Some(workout) = check_in.workout(date) {
        let logged: Result<WorkoutRecorded> = async {
            workout.validate()?;
            client.post(&["users", user_id, "workouts"], &workout).await
        }
        .await;
        match logged {
            Ok(r) => recorded = Some(r),
            Err(e) => warnings.push(format!("workout not logged: {:#}", e)),
        }
    }

    let coaching = match fetch_coaching(client, user_id, check_in.condition_score).await {
        Ok(advice) => Some(advice),
        Err(e) => {
            warnings.push(format!("no coaching: {:#}", e));
            None
        }
    };

    CheckInReply {
        check_in,
        recorded,
        coaching,
        warnings,
    }
}

fn print_reply(reply: &CheckInReply, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(reply);
    }

    let c = &reply.check_in;
    let outcome = match c.workout_completed {
        Some(true) => format!("completed, {} min", c.duration_minutes),
        Some(false) => "missed".to_string(),
        None => "no workout mentioned".to_string(),
    };
    print_info(&format!(
        "Heard: {} | difficulty {} | condition {} | mood {}",
        outcome,
        c.difficulty,
        c.condition_score,
        c.mood.as_str()
    ));
    if let Some(recorded) = &reply.recorded {
        print_success(&format!(
            "{} ({} records total)",
            recorded.message, recorded.total_records
        ));
    }
    for warning in &reply.warnings {
        print_warning(warning);
    }
    if let Some(advice) = &reply.coaching {
        print_coaching(advice);
    }
    Ok(())
}
