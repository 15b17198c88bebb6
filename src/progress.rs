//! Durable player progress: profile, per-plant mastery, streaks.

use crate::catalog::Catalog;
use crate::models::{LevelChange, Plant, PlantStats, PlayerProfile};
use crate::store::SharedStore;
use chrono::{DateTime, Duration, Local, Utc};
use tracing::warn;

/// Store key for the profile blob.
pub const PROFILE_KEY: &str = "profile";

/// Tunables governing mastery and the daily streak.
#[derive(Debug, Clone, Copy)]
pub struct ProgressRules {
    /// Top mastery level; a correct answer never raises a plant past it.
    pub max_mastery: u8,
    /// Gap after which the daily streak breaks.
    pub daily_streak_hours: i64,
}

impl Default for ProgressRules {
    fn default() -> Self {
        Self {
            max_mastery: 3,
            daily_streak_hours: 36,
        }
    }
}

/// The player's persisted progress, write-through on every mutation.
pub struct ProgressStore {
    store: SharedStore,
    profile: PlayerProfile,
    rules: ProgressRules,
}

impl ProgressStore {
    /// Load the profile from the store, falling back to defaults on absence
    /// or parse failure, and ensure a stats entry exists for every catalog
    /// plant so catalog growth never leaves a gap.
    pub fn load(store: SharedStore, catalog: &Catalog, rules: ProgressRules) -> Self {
        let profile = match store.get(PROFILE_KEY) {
            Some(blob) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                warn!(error = %e, "profile blob unreadable, starting fresh");
                PlayerProfile::default()
            }),
            None => PlayerProfile::default(),
        };

        let mut progress = Self {
            store,
            profile,
            rules,
        };
        for plant in catalog.iter() {
            progress.profile.plant_stats.entry(plant.id.clone()).or_default();
        }
        progress
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn rules(&self) -> ProgressRules {
        self.rules
    }

    /// Serialize and write the profile. Best-effort.
    pub fn save(&self) {
        match serde_json::to_string(&self.profile) {
            Ok(blob) => self.store.set(PROFILE_KEY, &blob),
            Err(e) => warn!(error = %e, "failed to serialize profile"),
        }
    }

    /// Apply the daily-streak rule for a session starting at `now`.
    ///
    /// First play: no change. Gap over the threshold: reset to 0. New local
    /// calendar day within the threshold: increment. Same day: no change.
    /// Always stamps `last_play` and persists.
    pub fn update_daily_streak(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.profile.last_play {
            let elapsed = now.signed_duration_since(last);
            if elapsed > Duration::hours(self.rules.daily_streak_hours) {
                self.profile.daily_streak = 0;
            } else {
                let last_day = last.with_timezone(&Local).date_naive();
                let today = now.with_timezone(&Local).date_naive();
                if last_day != today {
                    self.profile.daily_streak += 1;
                }
            }
        }
        self.profile.last_play = Some(now);
        self.save();
    }

    /// Record one answer for a plant: mastery, streak, and totals.
    ///
    /// A correct answer raises the plant one level (capped at the max); an
    /// incorrect answer drops it straight back to 0. `leveled_up` fires
    /// exactly once, on the transition into the top level.
    pub fn record_answer(&mut self, plant_id: &str, correct: bool) -> LevelChange {
        let max = self.rules.max_mastery;
        let stats = self.profile.plant_stats.entry(plant_id.to_string()).or_default();
        let previous_level = stats.mastery_level;

        stats.times_shown += 1;
        self.profile.total_answered += 1;

        let new_level = if correct {
            stats.times_correct += 1;
            previous_level.saturating_add(1).min(max)
        } else {
            0
        };
        stats.mastery_level = new_level;

        if correct {
            self.profile.total_correct += 1;
            self.profile.current_streak += 1;
            if self.profile.current_streak > self.profile.best_streak {
                self.profile.best_streak = self.profile.current_streak;
            }
        } else {
            self.profile.current_streak = 0;
        }

        self.save();
        LevelChange {
            leveled_up: correct && new_level == max && new_level > previous_level,
            previous_level,
            new_level,
        }
    }

    /// Set a new high score iff strictly greater. Returns whether it was a
    /// new record; only then is anything written.
    pub fn update_high_score(&mut self, score: i64) -> bool {
        if score > self.profile.high_score {
            self.profile.high_score = score;
            self.save();
            true
        } else {
            false
        }
    }

    pub fn increment_games_played(&mut self) {
        self.profile.games_played += 1;
        self.save();
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.profile.dark_mode = !self.profile.dark_mode;
        self.save();
        self.profile.dark_mode
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.profile.sound_enabled = !self.profile.sound_enabled;
        self.save();
        self.profile.sound_enabled
    }

    /// Stats for one plant (default if never seen).
    pub fn stats(&self, plant_id: &str) -> PlantStats {
        self.profile
            .plant_stats
            .get(plant_id)
            .copied()
            .unwrap_or_default()
    }

    /// The weighted selection pool: each plant repeated
    /// `(max_mastery + 1) - mastery_level` times, never less than once, so
    /// mastered plants stay reachable but rare.
    pub fn weighted_pool(&self, catalog: &Catalog) -> Vec<Plant> {
        let max = self.rules.max_mastery as u32;
        let mut pool = Vec::new();
        for plant in catalog.iter() {
            let level = self.stats(&plant.id).mastery_level as u32;
            let weight = (max + 1).saturating_sub(level).max(1);
            for _ in 0..weight {
                pool.push(plant.clone());
            }
        }
        pool
    }

    /// Count of plants at the top mastery level.
    pub fn mastered_count(&self, catalog: &Catalog) -> usize {
        catalog
            .iter()
            .filter(|p| self.stats(&p.id).mastery_level >= self.rules.max_mastery)
            .count()
    }
}
