//! Coaching commands

use anyhow::Result;
use coach_lib::CoachingRequest;
use colored::Colorize;
use serde_json::json;

use crate::client::{ApiClient, CoachingResponse, ServiceStatus};
use crate::commands::users::{fetch_profile, fetch_stats, print_profile, print_stats};
use crate::output::{
    color_risk, color_source, format_fraction, print_error, print_field, print_info, print_json,
    print_warning, OutputFormat,
};

/// Conditions tried in order by `exercise`
const EXERCISE_CONDITIONS: [u8; 3] = [2, 3, 4];

pub async fn request_coaching(
    client: &ApiClient,
    user_id: &str,
    condition: u8,
    format: OutputFormat,
) -> Result<()> {
    let advice = fetch_coaching(client, user_id, condition).await?;
    match format {
        OutputFormat::Json => print_json(&advice)?,
        OutputFormat::Table => print_coaching(&advice),
    }
    Ok(())
}

pub(crate) async fn fetch_coaching(
    client: &ApiClient,
    user_id: &str,
    condition: u8,
) -> Result<CoachingResponse> {
    let request = CoachingRequest {
        current_condition: condition,
    };
    request.validate()?;
    client
        .post(&["users", user_id, "coaching"], &request)
        .await
}

pub(crate) fn print_coaching(advice: &CoachingResponse) {
    println!("Coaching for {}", advice.user_name.bold());
    print_field(
        "Dropout risk",
        format!(
            "{} ({})",
            color_risk(advice.dropout_risk),
            format_fraction(advice.dropout_probability)
        ),
    );
    print_field(
        "Difficulty",
        format!(
            "{} -> {}",
            advice.current_difficulty, advice.recommended_difficulty
        ),
    );
    let perf = &advice.recent_performance;
    print_field("Recent success", format_fraction(perf.success_rate));
    print_field("Streak", format!("{} days", perf.streak));
    print_field("Days since miss", perf.days_since_fail);
    print_field("Message source", color_source(advice.message_source));
    println!();
    println!("  {}", advice.ai_message.italic());
}

/// Walk users through profile, stats and coaching
pub async fn exercise(client: &ApiClient, user_ids: &[String], format: OutputFormat) -> Result<()> {
    let status: ServiceStatus = client.get(&[]).await?;
    if format == OutputFormat::Table {
        print_info(&format!("{} ({})", status.message, status.status));
    }

    let mut report = Vec::new();
    for user_id in user_ids {
        if format == OutputFormat::Table {
            println!("\n{}", format!("== {} ==", user_id).bold());
        }

        // One user's failure is reported and the walk moves on
        let fetched = match fetch_profile(client, user_id).await {
            Ok(profile) => fetch_stats(client, user_id)
                .await
                .map(|stats| (profile, stats)),
            Err(e) => Err(e),
        };
        let (profile, stats) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                print_error(&format!("{}: {:#}", user_id, e));
                report.push(json!({ "user_id": user_id, "error": format!("{:#}", e) }));
                continue;
            }
        };

        let mut coaching = None;
        for condition in EXERCISE_CONDITIONS {
            match fetch_coaching(client, user_id, condition).await {
                Ok(advice) => {
                    coaching = Some((condition, advice));
                    break;
                }
                Err(e) => print_warning(&format!("condition {}: {:#}", condition, e)),
            }
        }

        match format {
            OutputFormat::Json => report.push(json!({
                "user_id": user_id,
                "profile": profile,
                "stats": stats,
                "condition": coaching.as_ref().map(|(c, _)| *c),
                "coaching": coaching.as_ref().map(|(_, a)| a),
            })),
            OutputFormat::Table => {
                print_profile(&profile);
                print_stats(&stats);
                match &coaching {
                    Some((condition, advice)) => {
                        print_info(&format!("Today's condition: {}", condition));
                        print_coaching(advice);
                    }
                    None => print_warning("No coaching available for this user"),
                }
            }
        }
    }

    if format == OutputFormat::Json {
        print_json(&report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn profile_body(user_id: &str) -> Value {
        json!({
            "user_id": user_id,
            "age": 31,
            "name": "Sam",
            "workout_goal": "stamina",
            "personality_type": "friendly"
        })
    }

    fn stats_body() -> Value {
        json!({
            "user_name": "Sam",
            "total_days": 1,
            "total_success_rate": 100.0,
            "recent_7_days_success": "1/1",
            "recent_success_rate": 100.0,
            "current_streak": 1,
            "last_workout": "2026-05-01"
        })
    }

    fn coaching_body() -> Value {
        json!({
            "user_name": "Sam",
            "dropout_probability": 0.2,
            "dropout_risk": "low",
            "current_difficulty": 3,
            "recommended_difficulty": 3,
            "ai_message": "Keep it going.",
            "message_source": "template",
            "recent_performance": { "success_rate": 1.0, "streak": 1, "days_since_fail": 1 },
            "timestamp": "2026-05-02T08:00:00Z"
        })
    }

    async fn json_mock(
        server: &mut mockito::Server,
        method: &str,
        path: &str,
        status: usize,
        body: Value,
    ) -> mockito::Mock {
        server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_exercise_moves_past_failing_users() {
        let mut server = mockito::Server::new_async().await;
        let _status = json_mock(
            &mut server,
            "GET",
            "/",
            200,
            json!({ "message": "Coach running", "status": "healthy" }),
        )
        .await;

        // Unknown profile
        let missing = json_mock(
            &mut server,
            "GET",
            "/users/ghost/profile",
            404,
            json!({ "error": "User ghost not found", "code": "user_not_found" }),
        )
        .await;

        // Profile loads but stats fail
        let _broken_profile = json_mock(
            &mut server,
            "GET",
            "/users/broken/profile",
            200,
            profile_body("broken"),
        )
        .await;
        let broken_stats = json_mock(
            &mut server,
            "GET",
            "/users/broken/stats",
            500,
            json!({ "error": "store read failed", "code": "store_error" }),
        )
        .await;
        let broken_coaching = server
            .mock("POST", "/users/broken/coaching")
            .expect(0)
            .create_async()
            .await;

        let _sam_profile =
            json_mock(&mut server, "GET", "/users/sam/profile", 200, profile_body("sam")).await;
        let _sam_stats = json_mock(&mut server, "GET", "/users/sam/stats", 200, stats_body()).await;
        let sam_coaching =
            json_mock(&mut server, "POST", "/users/sam/coaching", 200, coaching_body()).await;

        let client = ApiClient::new(&server.url()).unwrap();
        let users = vec!["ghost".to_string(), "broken".to_string(), "sam".to_string()];
        let result = exercise(&client, &users, OutputFormat::Json).await;

        assert!(result.is_ok(), "{:?}", result.err());
        missing.assert_async().await;
        broken_stats.assert_async().await;
        broken_coaching.assert_async().await;
        sam_coaching.assert_async().await;
    }

    #[tokio::test]
    async fn test_exercise_fails_when_service_is_down() {
        let mut server = mockito::Server::new_async().await;
        let _status = json_mock(&mut server, "GET", "/", 503, json!({ "error": "down" })).await;

        let client = ApiClient::new(&server.url()).unwrap();
        let result = exercise(&client, &["sam".to_string()], OutputFormat::Json).await;
        assert!(result.is_err());
    }
}
