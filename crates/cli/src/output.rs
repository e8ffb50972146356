//! Output formatting utilities

use clap::ValueEnum;
use coach_lib::{MessageSource, RiskTier};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print rows as a rounded table, or the raw items as JSON
pub fn print_table<T: Tabled>(rows: Vec<T>, empty_message: &str) {
    if rows.is_empty() {
        print_warning(empty_message);
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Aligned `label: value` line
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", format!("{}:", label).dimmed(), value);
}

/// Format a 0-1 fraction as a percentage
pub fn format_fraction(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn color_risk(risk: RiskTier) -> String {
    match risk {
        RiskTier::Low => risk.as_str().green().to_string(),
        RiskTier::Medium => risk.as_str().yellow().to_string(),
        RiskTier::High => risk.as_str().red().bold().to_string(),
    }
}

pub fn color_source(source: MessageSource) -> String {
    match source {
        MessageSource::Template => "template".normal().to_string(),
        MessageSource::Remote => "remote".cyan().to_string(),
        MessageSource::TemplateFallback => "template (fallback)".yellow().to_string(),
    }
}

pub fn color_outcome(completed: bool) -> String {
    if completed {
        "done".green().to_string()
    } else {
        "missed".red().to_string()
    }
}
