//! Data models for the plant quiz.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A plant in the identification catalog.
///
/// Catalog entries are immutable for the life of the process; progress is
/// tracked separately in [`PlantStats`] keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    /// Stable identifier (e.g. "monstera").
    pub id: String,
    /// Scientific name, shown as the answer text.
    pub scientific_name: String,
    /// Common names, in display order.
    #[serde(default)]
    pub common_names: Vec<String>,
    /// Memory aid shown after the question resolves.
    pub mnemonic: String,
    /// Reference to the plant photo (URL or path).
    pub image_ref: String,
}

impl Plant {
    /// Primary common name, falling back to the scientific name.
    pub fn common_name(&self) -> &str {
        self.common_names
            .first()
            .map(String::as_str)
            .unwrap_or(&self.scientific_name)
    }
}

/// Per-plant recall statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantStats {
    /// How many times the plant was asked.
    #[serde(default)]
    pub times_shown: u32,
    /// How many times it was answered correctly.
    #[serde(default)]
    pub times_correct: u32,
    /// Current mastery level, 0..=max. Resets to 0 on any miss.
    #[serde(default)]
    pub mastery_level: u8,
}

/// The player's persisted profile.
///
/// Every field carries a serde default so blobs written by older versions
/// (or hand-edited ones with missing fields) load by filling the gaps from
/// defaults instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub high_score: i64,
    /// Consecutive correct answers, across rounds.
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub total_answered: u32,
    #[serde(default)]
    pub games_played: u32,
    /// Per-plant stats. Sorted map so repeated serialization is byte-stable.
    #[serde(default)]
    pub plant_stats: BTreeMap<String, PlantStats>,
    /// Distinct calendar days played without a 36h+ gap.
    #[serde(default)]
    pub daily_streak: u32,
    #[serde(default)]
    pub last_play: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            high_score: 0,
            current_streak: 0,
            best_streak: 0,
            total_correct: 0,
            total_answered: 0,
            games_played: 0,
            plant_stats: BTreeMap::new(),
            daily_streak: 0,
            last_play: None,
            dark_mode: true,
            sound_enabled: true,
        }
    }
}

impl PlayerProfile {
    /// Overall accuracy (0.0 to 1.0).
    pub fn accuracy(&self) -> f64 {
        if self.total_answered == 0 {
            0.0
        } else {
            self.total_correct as f64 / self.total_answered as f64
        }
    }
}

/// Attempt/error/timing stats for one plant, independent of mastery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyStats {
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub errors: u32,
    #[serde(default)]
    pub total_response_ms: u64,
}

impl DifficultyStats {
    /// Fraction of attempts answered wrong.
    pub fn error_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.errors as f64 / self.attempts as f64
        }
    }

    /// Mean response time in milliseconds.
    pub fn avg_response_ms(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.total_response_ms as f64 / self.attempts as f64
        }
    }
}

/// Result of a mastery update after one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    /// True exactly once: on the transition into the top mastery level.
    pub leveled_up: bool,
    pub previous_level: u8,
    pub new_level: u8,
}

/// One of the four choices offered for a question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOption {
    /// Text shown on the button (a scientific name).
    pub display_text: String,
    pub is_correct: bool,
    /// The plant this option names.
    pub plant: Plant,
}

/// A missed question, kept for the end-of-round review.
#[derive(Debug, Clone, PartialEq)]
pub struct WrongAnswer {
    pub plant: Plant,
    /// What the player picked instead.
    pub chosen_text: String,
}

/// Emitted when a new question becomes active.
#[derive(Debug, Clone)]
pub struct QuestionReady {
    pub plant: Plant,
    /// Four options in display order; exactly one has `is_correct`.
    pub options: Vec<AnswerOption>,
    /// 1-based.
    pub question_number: usize,
    pub total_questions: usize,
}

/// Emitted when an answer is accepted and scored.
#[derive(Debug, Clone)]
pub struct AnswerResolved {
    pub correct: bool,
    pub correct_option: AnswerOption,
    pub chosen_option: AnswerOption,
    /// Net score change: base + speed bonus - hint penalty. Can be negative.
    pub score_delta: i64,
    pub leveled_up: bool,
    pub speed_bonus: i64,
    /// Current streak after this answer.
    pub streak: u32,
}

/// Final summary handed to the caller when a round completes.
#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub score: i64,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub wrong_answers: Vec<WrongAnswer>,
    pub is_new_high_score: bool,
}

impl RoundSummary {
    /// True when every question in the round was answered correctly.
    pub fn is_perfect(&self) -> bool {
        self.wrong_count == 0 && self.correct_count > 0
    }
}
