//! Free-text check-ins
//!
//! Reads a short message such as "did 20 minutes, pretty tired" and guesses
//! the workout outcome, difficulty, duration, today's condition and mood from
//! keywords. Failure words win over success words so that "didn't finish"
//! reads as a miss. Anything not mentioned keeps a neutral default.

use crate::models::NewWorkout;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DIFFICULTY: u8 = 3;
pub const DEFAULT_DURATION_MINUTES: u32 = 10;
pub const DEFAULT_CONDITION: u8 = 3;

const MISSED: &[&str] = &[
    "didn't",
    "did not",
    "couldn't",
    "could not",
    "skipped",
    "missed",
    "gave up",
    "failed",
    "no workout",
];
const COMPLETED: &[&str] = &[
    "done",
    "finished",
    "completed",
    "worked out",
    "did it",
    "trained",
    "made it",
    "did ",
];

const HARD: &[&str] = &["hard", "tough", "brutal", "killer", "too much", "intense"];
const EASY: &[&str] = &["easy", "light", "simple", "moderate", "gentle"];

const BAD_CONDITION: &[&str] = &[
    "tired",
    "exhausted",
    "sick",
    "sore",
    "hurt",
    "awful",
    "terrible",
    "not good",
    "not great",
];
const GOOD_CONDITION: &[&str] = &["great", "good", "fine", "fresh", "energized", "perfect"];

const NEGATIVE_MOOD: &[&str] = &[
    "stressed",
    "depressed",
    "annoyed",
    "unmotivated",
    "want to quit",
    "feeling down",
];
const POSITIVE_MOOD: &[&str] = &["proud", "happy", "confident", "accomplished", "motivated"];

/// Overall tone of a check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Positive,
    Neutral,
    Negative,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Positive => "positive",
            Mood::Neutral => "neutral",
            Mood::Negative => "negative",
        }
    }
}

/// What a check-in message says about today
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// `None` when the message does not say whether a workout happened
    pub workout_completed: Option<bool>,
    pub difficulty: u8,
    pub duration_minutes: u32,
    pub condition_score: u8,
    pub mood: Mood,
}

impl CheckIn {
    /// Interpret a free-text message
    pub fn analyze(text: &str) -> Self {
        let text = text.to_lowercase();

        let workout_completed = if mentions(&text, MISSED) {
            Some(false)
        } else if mentions(&text, COMPLETED) {
            Some(true)
        } else {
            None
        };

        let difficulty = if mentions(&text, HARD) {
            4
        } else if mentions(&text, EASY) {
            2
        } else {
            DEFAULT_DIFFICULTY
        };

        let condition_score = if mentions(&text, BAD_CONDITION) {
            2
        } else if mentions(&text, GOOD_CONDITION) {
            4
        } else {
            DEFAULT_CONDITION
        };

        let mood = if mentions(&text, NEGATIVE_MOOD) {
            Mood::Negative
        } else if mentions(&text, POSITIVE_MOOD) {
            Mood::Positive
        } else {
            Mood::Neutral
        };

        Self {
            workout_completed,
            difficulty,
            duration_minutes: duration_minutes(&text).unwrap_or(DEFAULT_DURATION_MINUTES),
            condition_score,
            mood,
        }
    }

    /// Workout payload for the check-in, if the outcome is known.
    ///
    /// A missed workout is logged with zero minutes.
    pub fn workout(&self, date: Option<NaiveDate>) -> Option<NewWorkout> {
        let completed = self.workout_completed?;
        Some(NewWorkout {
            workout_completed: completed,
            difficulty: self.difficulty,
            duration_minutes: if completed { self.duration_minutes } else { 0 },
            condition_score: self.condition_score,
            date,
        })
    }
}

fn mentions(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// First "<n> min", "<n>min", "<n> hour" or "an hour" phrase
fn duration_minutes(text: &str) -> Option<u32> {
    if text.contains("half an hour") {
        return Some(30);
    }

    let words: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .filter(|w| !w.is_empty())
        .collect();

    for (i, word) in words.iter().enumerate() {
        let digits: String = word.chars().take_while(char::is_ascii_digit).collect();
        let unit = if digits.is_empty() {
            if matches!(*word, "an" | "one" | "a") {
                words.get(i + 1).copied().filter(|u| u.starts_with("hour"))
            } else {
                continue;
            }
        } else if digits.len() < word.len() {
            Some(&word[digits.len()..])
        } else {
            words.get(i + 1).copied()
        };
        let Some(unit) = unit else {
            continue;
        };
        let amount: u32 = if digits.is_empty() { 1 } else { digits.parse().ok()? };

        if unit.starts_with("min") {
            return Some(amount);
        }
        if unit.starts_with("hour") || unit == "h" || unit == "hr" || unit == "hrs" {
            return Some(amount.saturating_mul(60));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_hard_session() {
        let check_in = CheckIn::analyze("Finished 30 minutes, it was really hard");
        assert_eq!(check_in.workout_completed, Some(true));
        assert_eq!(check_in.difficulty, 4);
        assert_eq!(check_in.duration_minutes, 30);
        assert_eq!(check_in.condition_score, DEFAULT_CONDITION);
    }

    #[test]
    fn test_miss_wins_over_completion_words() {
        let check_in = CheckIn::analyze("I didn't get it done today, so tired and stressed");
        assert_eq!(check_in.workout_completed, Some(false));
        assert_eq!(check_in.condition_score, 2);
        assert_eq!(check_in.mood, Mood::Negative);

        let workout = check_in.workout(None).unwrap();
        assert!(!workout.workout_completed);
        assert_eq!(workout.duration_minutes, 0);
    }

    #[test]
    fn test_not_good_is_a_bad_condition() {
        assert_eq!(CheckIn::analyze("feeling not good").condition_score, 2);
        assert_eq!(CheckIn::analyze("feeling good").condition_score, 4);
    }

    #[test]
    fn test_unknown_outcome_has_no_workout() {
        let check_in = CheckIn::analyze("hello coach");
        assert_eq!(check_in.workout_completed, None);
        assert!(check_in.workout(None).is_none());
        assert_eq!(check_in.difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(check_in.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert_eq!(check_in.mood, Mood::Neutral);
    }

    #[test]
    fn test_duration_phrases() {
        assert_eq!(duration_minutes("did 15min of stretching"), Some(15));
        assert_eq!(duration_minutes("ran for an hour"), Some(60));
        assert_eq!(duration_minutes("2 hours at the gym"), Some(120));
        assert_eq!(duration_minutes("half an hour, easy"), Some(30));
        assert_eq!(duration_minutes("3 sets of squats"), None);
    }

    #[test]
    fn test_workout_payload_validates() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
        let workout = CheckIn::analyze("completed an easy 20 min walk, feeling great")
            .workout(Some(date))
            .unwrap();
        assert!(workout.validate().is_ok());
        assert_eq!(workout.difficulty, 2);
        assert_eq!(workout.duration_minutes, 20);
        assert_eq!(workout.condition_score, 4);
        assert_eq!(workout.date, Some(date));
    }
}
