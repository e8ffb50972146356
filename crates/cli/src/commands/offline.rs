//! Offline commands that work on data files without a running server

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use coach_lib::predictor::{FeatureExtractor, TrainingSample};
use coach_lib::store::{self, UserTable};
use coach_lib::synthetic::{PopulationConfig, SyntheticPopulation};
use coach_lib::WorkoutLog;
use serde_json::json;

use crate::output::{print_json, print_success, OutputFormat};

/// Generate a synthetic population and write it as a user table
pub async fn seed(
    output: &Path,
    users: usize,
    days: usize,
    end_date: Option<NaiveDate>,
    seed: u64,
    format: OutputFormat,
) -> Result<()> {
    let end_date = end_date.unwrap_or_else(|| Local::now().date_naive());
    let config = PopulationConfig::new(users, days, end_date, seed);
    let table = SyntheticPopulation::generate(&config);

    store::write_snapshot(output, &table)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let total_logs: usize = table.values().map(|r| r.logs.len()).sum();
    match format {
        OutputFormat::Json => print_json(&json!({
            "path": output.display().to_string(),
            "users": table.len(),
            "logs": total_logs,
            "end_date": end_date,
            "seed": seed,
        }))?,
        OutputFormat::Table => print_success(&format!(
            "Wrote {} users and {} logs to {}",
            table.len(),
            total_logs,
            output.display()
        )),
    }
    Ok(())
}

/// Turn a user table into JSON Lines training samples
pub async fn dataset(input: &Path, output: &Path, format: OutputFormat) -> Result<()> {
    let table = read_table(input).await?;
    let samples = build_samples(&table);

    let mut body = String::new();
    for sample in &samples {
        body.push_str(&serde_json::to_string(sample)?);
        body.push('\n');
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, body)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let positives = samples.iter().filter(|s| s.label == 1).count();
    match format {
        OutputFormat::Json => print_json(&json!({
            "path": output.display().to_string(),
            "samples": samples.len(),
            "positive_labels": positives,
        }))?,
        OutputFormat::Table => print_success(&format!(
            "Wrote {} samples ({} labelled as dropout) to {}",
            samples.len(),
            positives,
            output.display()
        )),
    }
    Ok(())
}

async fn read_table(path: &Path) -> Result<UserTable> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid user table in {}", path.display()))
}

fn build_samples(table: &UserTable) -> Vec<TrainingSample> {
    let logs: Vec<WorkoutLog> = table
        .values()
        .flat_map(|record| record.logs.iter().cloned())
        .collect();
    FeatureExtractor::new().build_training_set(&logs)
}
