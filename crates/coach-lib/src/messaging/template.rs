//! Template-based message generation

use super::{MessageContext, MessageGenerator};
use crate::models::{CoachingMessage, MessageSource, RiskTier};
use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};

/// Users at or below this age get the casual tone
pub const YOUTH_AGE_MAX: u32 = 16;

const HIGH_RISK_TEMPLATES: &[&str] = &[
    "{name}, today was tough. Could you please try just five minutes of light movement?",
    "{name}, it does not have to be perfect. Stretching alone counts as a win today.",
    "Start small when things get hard, {name}. You can go at your own pace.",
    "{name}, resting is a strategy too. Keep it light today for the sake of tomorrow.",
];

const MEDIUM_RISK_TEMPLATES: &[&str] = &[
    "{name}, you are at a {success_rate}% success rate! Let us go a little lighter today.",
    "Nice momentum, {name}! Let us lower the difficulty a notch and protect the habit.",
    "One step at a time toward your {goal} goal, {name}.",
    "It does not need to be perfect. You are already on a {streak}-day run, {name}!",
];

const LOW_RISK_TEMPLATES: &[&str] = &[
    "Wow, {name}, you are doing great! Keep this flow going.",
    "{name}, {streak} days in a row! Are you ready to push a little further?",
    "Impressive, {name}! You are one step closer to your {goal} goal.",
    "You are showing the power of consistency! Keep going your way, {name}.",
];

const GENERIC_TONE: &[&str] = &["You've got this"];

/// Formal phrasing and its casual replacement
const CASUAL_REWRITES: &[(&str, &str)] = &[
    ("Could you please try", "Try"),
    ("please ", ""),
    ("does not", "doesn't"),
    ("do not", "don't"),
    ("You are", "You're"),
    ("you are", "you're"),
    ("Are you ready", "Ready"),
    ("Let us", "Let's"),
    ("Impressive", "Awesome"),
];

fn templates_for(risk: RiskTier) -> &'static [&'static str] {
    match risk {
        RiskTier::High => HIGH_RISK_TEMPLATES,
        RiskTier::Medium => MEDIUM_RISK_TEMPLATES,
        RiskTier::Low => LOW_RISK_TEMPLATES,
    }
}

fn tone_words_for(personality_type: &str) -> &'static [&'static str] {
    match personality_type.trim().to_ascii_lowercase().as_str() {
        "encouraging" => &["Hang in there", "It's okay", "You're doing fine", "Take it slow"],
        "challenging" => &["Take it on", "Eyes on the goal", "Get stronger", "You're growing"],
        "analytical" => &[
            "The numbers back you up",
            "The trend looks solid",
            "Consistency compounds",
            "The data says keep going",
        ],
        "friendly" => &[
            "Hey, we got this",
            "How about it",
            "Let's do it together",
            "We're in this together",
        ],
        _ => GENERIC_TONE,
    }
}

/// Strip formality markers for younger users
pub fn casual_tone(message: &str) -> String {
    CASUAL_REWRITES
        .iter()
        .fold(message.to_string(), |acc, (formal, casual)| acc.replace(formal, casual))
}

/// Source of template indices
pub trait TemplatePicker: Send + Sync {
    /// Index in `0..len`; `len` is never zero
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local RNG selection for production use
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl TemplatePicker for ThreadRngPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible selection from a seeded ChaCha stream
#[derive(Debug)]
pub struct SeededPicker {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl TemplatePicker for SeededPicker {
    fn pick(&self, len: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..len),
            Err(poisoned) => poisoned.into_inner().gen_range(0..len),
        }
    }
}

/// Always the same index (wrapped to the list length)
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl TemplatePicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Local, deterministic-given-picker message generator
#[derive(Clone)]
pub struct TemplateMessenger {
    picker: Arc<dyn TemplatePicker>,
}

impl Default for TemplateMessenger {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRngPicker))
    }
}

impl TemplateMessenger {
    pub fn new(picker: Arc<dyn TemplatePicker>) -> Self {
        Self { picker }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(Arc::new(SeededPicker::new(seed)))
    }

    /// Render a message without going through the async trait
    pub fn compose(&self, context: &MessageContext<'_>) -> String {
        let profile = context.profile;
        let templates = templates_for(context.risk);
        let template = templates[self.picker.pick(templates.len())];

        let base = template
            .replace("{name}", &profile.name)
            .replace("{goal}", &profile.workout_goal)
            .replace(
                "{success_rate}",
                &format!("{:.0}", context.performance.success_rate * 100.0),
            )
            .replace("{streak}", &context.performance.streak.to_string());

        let base = if profile.age <= YOUTH_AGE_MAX {
            casual_tone(&base)
        } else {
            base
        };

        let tone_words = tone_words_for(&profile.personality_type);
        let tone = tone_words[self.picker.pick(tone_words.len())];

        format!("{} {}!", base, tone)
    }
}

#[async_trait]
impl MessageGenerator for TemplateMessenger {
    async fn generate(&self, context: &MessageContext<'_>) -> CoachingMessage {
        CoachingMessage {
            text: self.compose(context),
            source: MessageSource::Template,
        }
    }

    fn strategy(&self) -> &'static str {
        "template"
    }
}
