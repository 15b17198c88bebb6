//! Configuration for the quiz game.

use crate::progress::ProgressRules;
use crate::round::ScoringRules;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gameplay: GameplayConfig,
    #[serde(default)]
    pub mastery: MasteryConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Optional JSON file overriding the built-in plant catalog.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "leaf-and-learn")
            .map(|d| d.config_dir().join("config.toml"))
    }

    pub fn db_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "leaf-and-learn")
            .map(|d| d.data_dir().join("progress.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "leaf-and-learn")
            .map(|d| d.data_dir().join("leaf-and-learn.log"))
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            points_per_correct: self.gameplay.points_per_correct,
            fast_threshold_ms: self.gameplay.speed_bonus.fast_threshold_ms,
            fast_bonus: self.gameplay.speed_bonus.fast_bonus,
            medium_threshold_ms: self.gameplay.speed_bonus.medium_threshold_ms,
            medium_bonus: self.gameplay.speed_bonus.medium_bonus,
            hint_penalty: self.gameplay.hint_penalty,
        }
    }

    pub fn progress_rules(&self) -> ProgressRules {
        ProgressRules {
            max_mastery: self.mastery.max_level,
            daily_streak_hours: self.mastery.daily_streak_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameplayConfig {
    #[serde(default = "default_questions_per_round")]
    pub questions_per_round: usize,
    #[serde(default = "default_points_per_correct")]
    pub points_per_correct: i64,
    #[serde(default = "default_hint_penalty")]
    pub hint_penalty: i64,
    /// Delay before an answered question auto-advances.
    #[serde(default = "default_advance_delay")]
    pub auto_advance_delay_ms: u64,
    #[serde(default)]
    pub speed_bonus: SpeedBonusConfig,
}

fn default_questions_per_round() -> usize { 10 }
fn default_points_per_correct() -> i64 { 10 }
fn default_hint_penalty() -> i64 { 5 }
fn default_advance_delay() -> u64 { 3500 }

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            questions_per_round: 10,
            points_per_correct: 10,
            hint_penalty: 5,
            auto_advance_delay_ms: 3500,
            speed_bonus: SpeedBonusConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedBonusConfig {
    #[serde(default = "default_fast_threshold")]
    pub fast_threshold_ms: u64,
    #[serde(default = "default_fast_bonus")]
    pub fast_bonus: i64,
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold_ms: u64,
    #[serde(default = "default_medium_bonus")]
    pub medium_bonus: i64,
}

fn default_fast_threshold() -> u64 { 2000 }
fn default_fast_bonus() -> i64 { 3 }
fn default_medium_threshold() -> u64 { 4000 }
fn default_medium_bonus() -> i64 { 1 }

impl Default for SpeedBonusConfig {
    fn default() -> Self {
        Self {
            fast_threshold_ms: 2000,
            fast_bonus: 3,
            medium_threshold_ms: 4000,
            medium_bonus: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryConfig {
    /// Top mastery level.
    #[serde(default = "default_max_level")]
    pub max_level: u8,
    /// Hours without playing before the daily streak breaks.
    #[serde(default = "default_streak_hours")]
    pub daily_streak_hours: i64,
}

fn default_max_level() -> u8 { 3 }
fn default_streak_hours() -> i64 { 36 }

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            max_level: 3,
            daily_streak_hours: 36,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Streak length that earns the fire marker.
    #[serde(default = "default_streak_fire")]
    pub streak_fire: u32,
    /// Streak length that earns the explosion marker.
    #[serde(default = "default_streak_explosion")]
    pub streak_explosion: u32,
    /// Show the plant's memory aid after each answer.
    #[serde(default = "default_true")]
    pub show_mnemonic: bool,
}

fn default_streak_fire() -> u32 { 5 }
fn default_streak_explosion() -> u32 { 10 }
fn default_true() -> bool { true }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            streak_fire: 5,
            streak_explosion: 10,
            show_mnemonic: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_game_constants() {
        let config = Config::default();
        assert_eq!(config.gameplay.questions_per_round, 10);
        assert_eq!(config.gameplay.points_per_correct, 10);
        assert_eq!(config.gameplay.hint_penalty, 5);
        assert_eq!(config.gameplay.auto_advance_delay_ms, 3500);
        assert_eq!(config.gameplay.speed_bonus.fast_threshold_ms, 2000);
        assert_eq!(config.mastery.max_level, 3);
        assert_eq!(config.mastery.daily_streak_hours, 36);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [gameplay]
            questions_per_round = 5

            [mastery]
            max_level = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.gameplay.questions_per_round, 5);
        assert_eq!(config.gameplay.points_per_correct, 10);
        assert_eq!(config.mastery.max_level, 5);
        assert_eq!(config.mastery.daily_streak_hours, 36);
        assert_eq!(config.display.streak_fire, 5);
    }

    #[test]
    fn test_rule_conversion() {
        let config = Config::default();
        let scoring = config.scoring_rules();
        assert_eq!(scoring.points_per_correct, 10);
        assert_eq!(scoring.speed_bonus(1500), 3);
        assert_eq!(scoring.speed_bonus(3000), 1);
        assert_eq!(scoring.speed_bonus(5000), 0);

        let progress = config.progress_rules();
        assert_eq!(progress.max_mastery, 3);
    }
}
