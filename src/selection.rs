//! Question selection: weighted draws and answer-set construction.

use crate::catalog::Catalog;
use crate::models::{AnswerOption, Plant};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Options offered per question.
pub const OPTIONS_PER_QUESTION: usize = 4;
/// Wrong options removed by a hint.
pub const HINT_ELIMINATIONS: usize = 2;

/// Draws questions and builds answer sets.
pub struct SelectionEngine {
    rng: StdRng,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic engine for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform draw from the weighted pool. Draws are with replacement
    /// across questions; the same plant may repeat within a round.
    pub fn draw(&mut self, pool: &[Plant]) -> Option<Plant> {
        pool.choose(&mut self.rng).cloned()
    }

    /// Build the four answer options for a drawn plant: the plant itself
    /// plus three distractors sampled from the rest of the catalog, with the
    /// final order shuffled so the correct slot is uniformly random.
    pub fn answer_options(&mut self, catalog: &Catalog, correct: &Plant) -> Vec<AnswerOption> {
        let mut others = catalog.others(&correct.id);
        others.shuffle(&mut self.rng);

        let mut options: Vec<AnswerOption> = others
            .into_iter()
            .take(OPTIONS_PER_QUESTION - 1)
            .map(|plant| AnswerOption {
                display_text: plant.scientific_name.clone(),
                is_correct: false,
                plant: plant.clone(),
            })
            .collect();
        options.push(AnswerOption {
            display_text: correct.scientific_name.clone(),
            is_correct: true,
            plant: correct.clone(),
        });
        options.shuffle(&mut self.rng);
        options
    }

    /// Pick the wrong options a hint removes: two of the three incorrect
    /// indices, uniformly at random.
    pub fn eliminations(&mut self, options: &[AnswerOption]) -> Vec<usize> {
        let mut wrong: Vec<usize> = options
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.is_correct)
            .map(|(i, _)| i)
            .collect();
        wrong.shuffle(&mut self.rng);
        wrong.truncate(HINT_ELIMINATIONS);
        wrong
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{ProgressRules, ProgressStore};
    use crate::store::MemoryStore;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[test]
    fn test_answer_options_shape() {
        let catalog = Catalog::builtin();
        let mut engine = SelectionEngine::seeded(7);
        let correct = catalog.get("monstera").unwrap().clone();

        let options = engine.answer_options(&catalog, &correct);
        assert_eq!(options.len(), OPTIONS_PER_QUESTION);
        assert_eq!(options.iter().filter(|o| o.is_correct).count(), 1);

        // All four name distinct plants, and the correct one is the drawn one.
        let mut ids: Vec<&str> = options.iter().map(|o| o.plant.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), OPTIONS_PER_QUESTION);
        let winner = options.iter().find(|o| o.is_correct).unwrap();
        assert_eq!(winner.plant.id, "monstera");
        assert_eq!(winner.display_text, "Monstera deliciosa");
    }

    #[test]
    fn test_correct_slot_varies() {
        let catalog = Catalog::builtin();
        let mut engine = SelectionEngine::seeded(42);
        let correct = catalog.get("monstera").unwrap().clone();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            let options = engine.answer_options(&catalog, &correct);
            let slot = options.iter().position(|o| o.is_correct).unwrap();
            seen.insert(slot);
        }
        assert_eq!(seen.len(), OPTIONS_PER_QUESTION, "correct answer lands in every slot");
    }

    #[test]
    fn test_eliminations_are_wrong_options() {
        let catalog = Catalog::builtin();
        let mut engine = SelectionEngine::seeded(3);
        let correct = catalog.get("crassula").unwrap().clone();
        let options = engine.answer_options(&catalog, &correct);

        let eliminated = engine.eliminations(&options);
        assert_eq!(eliminated.len(), HINT_ELIMINATIONS);
        for &i in &eliminated {
            assert!(!options[i].is_correct);
        }
        assert_ne!(eliminated[0], eliminated[1]);
    }

    #[test]
    fn test_weighted_draw_favors_unmastered() {
        let catalog = Catalog::builtin();
        let mem = Rc::new(MemoryStore::new());
        let mut progress =
            ProgressStore::load(mem, &catalog, ProgressRules::default());

        // Master everything except monstera, which stays at weight 4 while
        // the rest drop to 1.
        for plant in catalog.iter().filter(|p| p.id != "monstera") {
            for _ in 0..3 {
                progress.record_answer(&plant.id, true);
            }
        }

        let pool = progress.weighted_pool(&catalog);
        let mut engine = SelectionEngine::seeded(99);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..4000 {
            let plant = engine.draw(&pool).unwrap();
            *counts.entry(plant.id).or_default() += 1;
        }

        // monstera holds 4 of 10 pool slots; each mastered plant holds 1.
        let monstera = counts["monstera"] as f64;
        let crassula = counts["crassula"] as f64;
        let ratio = monstera / crassula;
        assert!(ratio > 2.5 && ratio < 6.0, "expected ~4x, got {ratio}");
    }

    #[test]
    fn test_draw_empty_pool() {
        let mut engine = SelectionEngine::seeded(1);
        assert!(engine.draw(&[]).is_none());
    }
}
