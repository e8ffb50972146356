//! Subcommand implementations

pub mod checkin;
pub mod coaching;
pub mod offline;
pub mod users;
pub mod workouts;
