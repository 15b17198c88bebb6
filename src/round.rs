//! Round lifecycle: question flow, answer evaluation, and scoring.
//!
//! One `RoundEngine` drives a fixed-length round of questions through the
//! phases `AwaitingQuestion -> QuestionActive -> Answered`, looping until
//! every question has been asked and the round completes. Calls made in the
//! wrong phase (double submits, late hints) are silent no-ops; the engine
//! never fails on valid state.

use crate::analytics::DifficultyTracker;
use crate::catalog::Catalog;
use crate::models::{
    AnswerOption, AnswerResolved, Plant, QuestionReady, RoundSummary, WrongAnswer,
};
use crate::progress::ProgressStore;
use crate::selection::SelectionEngine;
use chrono::{DateTime, Utc};

/// Scoring tunables for a round.
#[derive(Debug, Clone, Copy)]
pub struct ScoringRules {
    pub points_per_correct: i64,
    /// Answers faster than this earn the big bonus.
    pub fast_threshold_ms: u64,
    pub fast_bonus: i64,
    /// Answers faster than this (but not fast) earn the small bonus.
    pub medium_threshold_ms: u64,
    pub medium_bonus: i64,
    /// Flat cost of using a hint, charged win or lose.
    pub hint_penalty: i64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            points_per_correct: 10,
            fast_threshold_ms: 2000,
            fast_bonus: 3,
            medium_threshold_ms: 4000,
            medium_bonus: 1,
            hint_penalty: 5,
        }
    }
}

impl ScoringRules {
    /// Bonus for a correct, hint-free answer at the given response time.
    pub fn speed_bonus(&self, response_ms: u64) -> i64 {
        if response_ms < self.fast_threshold_ms {
            self.fast_bonus
        } else if response_ms < self.medium_threshold_ms {
            self.medium_bonus
        } else {
            0
        }
    }
}

/// Where the engine is in the question lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingQuestion,
    QuestionActive,
    Answered,
    Complete,
}

/// Output of [`RoundEngine::next_question`].
#[derive(Debug, Clone)]
pub enum RoundEvent {
    Question(QuestionReady),
    Complete(RoundSummary),
}

struct ActiveQuestion {
    plant: Plant,
    options: Vec<AnswerOption>,
    started_at: DateTime<Utc>,
    hint_used: bool,
    eliminated: Vec<usize>,
}

/// State machine for one round of questions.
pub struct RoundEngine {
    rules: ScoringRules,
    total_questions: usize,
    question_index: usize,
    score: i64,
    correct_count: usize,
    wrong_count: usize,
    asked: Vec<String>,
    wrong_answers: Vec<WrongAnswer>,
    phase: Phase,
    active: Option<ActiveQuestion>,
    summary: Option<RoundSummary>,
    selection: SelectionEngine,
}

impl RoundEngine {
    pub fn new(rules: ScoringRules, total_questions: usize, selection: SelectionEngine) -> Self {
        Self {
            rules,
            total_questions,
            question_index: 0,
            score: 0,
            correct_count: 0,
            wrong_count: 0,
            asked: Vec::new(),
            wrong_answers: Vec::new(),
            phase: Phase::AwaitingQuestion,
            active: None,
            summary: None,
            selection,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Running score; the hint penalty can push it negative.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// 1-based number of the current (or last asked) question.
    pub fn question_number(&self) -> usize {
        self.question_index
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    /// Ids of every question asked so far, in order.
    pub fn asked_ids(&self) -> &[String] {
        &self.asked
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Advance to the next question, or complete the round once every
    /// question has been asked. No-op while a question is still active.
    /// Calling again after completion re-emits the same summary without
    /// re-recording anything.
    pub fn next_question(
        &mut self,
        progress: &mut ProgressStore,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> Option<RoundEvent> {
        match self.phase {
            Phase::QuestionActive => return None,
            Phase::Complete => return self.summary.clone().map(RoundEvent::Complete),
            Phase::AwaitingQuestion | Phase::Answered => {}
        }

        if self.question_index >= self.total_questions {
            return Some(RoundEvent::Complete(self.finish(progress)));
        }

        // Rebuild the pool each question so mastery gained earlier in the
        // round already lowers a plant's weight.
        let pool = progress.weighted_pool(catalog);
        let Some(plant) = self.selection.draw(&pool) else {
            return Some(RoundEvent::Complete(self.finish(progress)));
        };
        let options = self.selection.answer_options(catalog, &plant);

        self.question_index += 1;
        self.asked.push(plant.id.clone());
        let ready = QuestionReady {
            plant: plant.clone(),
            options: options.clone(),
            question_number: self.question_index,
            total_questions: self.total_questions,
        };
        self.active = Some(ActiveQuestion {
            plant,
            options,
            started_at: now,
            hint_used: false,
            eliminated: Vec::new(),
        });
        self.phase = Phase::QuestionActive;
        Some(RoundEvent::Question(ready))
    }

    /// Score the chosen option. Only valid while a question is active;
    /// repeated submits, out-of-range choices, and hint-eliminated choices
    /// are ignored.
    pub fn submit_answer(
        &mut self,
        choice: usize,
        now: DateTime<Utc>,
        progress: &mut ProgressStore,
        analytics: &mut DifficultyTracker,
    ) -> Option<AnswerResolved> {
        if self.phase != Phase::QuestionActive {
            return None;
        }
        let Some(active) = self.active.as_mut() else {
            return None;
        };
        if choice >= active.options.len() || active.eliminated.contains(&choice) {
            return None;
        }

        let response_ms = now
            .signed_duration_since(active.started_at)
            .num_milliseconds()
            .max(0) as u64;
        let correct = active.options[choice].is_correct;
        let Some(correct_option) = active.options.iter().find(|o| o.is_correct).cloned() else {
            return None;
        };
        let chosen_option = active.options[choice].clone();

        let change = progress.record_answer(&active.plant.id, correct);
        analytics.record_answer(&active.plant.id, correct, response_ms);

        let speed_bonus = if correct && !active.hint_used {
            self.rules.speed_bonus(response_ms)
        } else {
            0
        };
        let base = if correct {
            self.rules.points_per_correct + speed_bonus
        } else {
            0
        };
        let penalty = if active.hint_used {
            self.rules.hint_penalty
        } else {
            0
        };
        let score_delta = base - penalty;
        self.score += score_delta;

        if correct {
            self.correct_count += 1;
        } else {
            self.wrong_count += 1;
            self.wrong_answers.push(WrongAnswer {
                plant: active.plant.clone(),
                chosen_text: chosen_option.display_text.clone(),
            });
        }

        self.phase = Phase::Answered;
        Some(AnswerResolved {
            correct,
            correct_option,
            chosen_option,
            score_delta,
            leveled_up: change.leveled_up,
            speed_bonus,
            streak: progress.profile().current_streak,
        })
    }

    /// Eliminate two wrong options. Once per question, only while the
    /// question is active; returns the eliminated indices.
    pub fn use_hint(&mut self) -> Option<Vec<usize>> {
        if self.phase != Phase::QuestionActive {
            return None;
        }
        let Some(active) = self.active.as_mut() else {
            return None;
        };
        if active.hint_used {
            return None;
        }
        active.hint_used = true;
        active.eliminated = self.selection.eliminations(&active.options);
        Some(active.eliminated.clone())
    }

    fn finish(&mut self, progress: &mut ProgressStore) -> RoundSummary {
        let is_new_high_score = progress.update_high_score(self.score);
        progress.increment_games_played();

        let summary = RoundSummary {
            score: self.score,
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
            wrong_answers: self.wrong_answers.clone(),
            is_new_high_score,
        };
        self.summary = Some(summary.clone());
        self.active = None;
        self.phase = Phase::Complete;
        summary
    }
}

/// Single-owner slot for the deferred auto-advance.
///
/// Arming replaces any pending deadline, so there is never more than one
/// outstanding advance; `fire` returns true at most once per arm. The manual
/// and timed advance paths both funnel through this slot.
#[derive(Debug, Default)]
pub struct AdvanceSlot {
    deadline: Option<DateTime<Utc>>,
}

impl AdvanceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an advance, invalidating any previous pending one.
    pub fn arm(&mut self, at: DateTime<Utc>) {
        self.deadline = Some(at);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the deadline passes, then disarms itself.
    pub fn fire(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressRules;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use std::rc::Rc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 12, 0, 0).unwrap()
    }

    fn fixture() -> (Catalog, ProgressStore, DifficultyTracker, RoundEngine) {
        let catalog = Catalog::builtin();
        let progress = ProgressStore::load(
            Rc::new(MemoryStore::new()),
            &catalog,
            ProgressRules::default(),
        );
        let analytics = DifficultyTracker::load(Rc::new(MemoryStore::new()));
        let engine = RoundEngine::new(ScoringRules::default(), 10, SelectionEngine::seeded(11));
        (catalog, progress, analytics, engine)
    }

    fn question(
        engine: &mut RoundEngine,
        progress: &mut ProgressStore,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> QuestionReady {
        match engine.next_question(progress, catalog, now) {
            Some(RoundEvent::Question(q)) => q,
            other => panic!("expected a question, got {other:?}"),
        }
    }

    fn correct_index(q: &QuestionReady) -> usize {
        q.options.iter().position(|o| o.is_correct).unwrap()
    }

    fn wrong_index(q: &QuestionReady, eliminated: &[usize]) -> usize {
        q.options
            .iter()
            .enumerate()
            .find(|(i, o)| !o.is_correct && !eliminated.contains(i))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_fast_correct_scores_13() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();
        let q = question(&mut engine, &mut progress, &catalog, t0());
        let r = engine
            .submit_answer(
                correct_index(&q),
                t0() + Duration::milliseconds(1500),
                &mut progress,
                &mut analytics,
            )
            .unwrap();
        assert!(r.correct);
        assert_eq!(r.speed_bonus, 3);
        assert_eq!(r.score_delta, 13);
        assert_eq!(r.streak, 1);
    }

    #[test]
    fn test_medium_correct_scores_11() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();
        let q = question(&mut engine, &mut progress, &catalog, t0());
        let r = engine
            .submit_answer(
                correct_index(&q),
                t0() + Duration::milliseconds(3000),
                &mut progress,
                &mut analytics,
            )
            .unwrap();
        assert_eq!(r.score_delta, 11);
    }

    #[test]
    fn test_slow_correct_scores_10() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();
        let q = question(&mut engine, &mut progress, &catalog, t0());
        let r = engine
            .submit_answer(
                correct_index(&q),
                t0() + Duration::milliseconds(5000),
                &mut progress,
                &mut analytics,
            )
            .unwrap();
        assert_eq!(r.score_delta, 10);
        assert_eq!(r.speed_bonus, 0);
    }

    #[test]
    fn test_hint_disables_speed_bonus() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();
        let q = question(&mut engine, &mut progress, &catalog, t0());
        engine.use_hint().unwrap();
        // Fast and correct, but the hint costs 5 and kills the bonus.
        let r = engine
            .submit_answer(
                correct_index(&q),
                t0() + Duration::milliseconds(1500),
                &mut progress,
                &mut analytics,
            )
            .unwrap();
        assert_eq!(r.speed_bonus, 0);
        assert_eq!(r.score_delta, 5);
    }

    #[test]
    fn test_hint_plus_miss_goes_negative() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();
        let q = question(&mut engine, &mut progress, &catalog, t0());
        let eliminated = engine.use_hint().unwrap();
        let r = engine
            .submit_answer(
                wrong_index(&q, &eliminated),
                t0() + Duration::milliseconds(1500),
                &mut progress,
                &mut analytics,
            )
            .unwrap();
        assert!(!r.correct);
        assert_eq!(r.score_delta, -5);
        assert_eq!(engine.score(), -5);
        assert_eq!(r.streak, 0);
    }

    #[test]
    fn test_wrong_answer_recorded_for_review() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();
        let q = question(&mut engine, &mut progress, &catalog, t0());
        let wrong = wrong_index(&q, &[]);
        let chosen_text = q.options[wrong].display_text.clone();
        engine
            .submit_answer(wrong, t0(), &mut progress, &mut analytics)
            .unwrap();

        // Drain the rest of the round correctly.
        for _ in 1..10 {
            let q = question(&mut engine, &mut progress, &catalog, t0());
            engine
                .submit_answer(correct_index(&q), t0(), &mut progress, &mut analytics)
                .unwrap();
        }
        let summary = match engine.next_question(&mut progress, &catalog, t0()) {
            Some(RoundEvent::Complete(s)) => s,
            other => panic!("expected summary, got {other:?}"),
        };
        assert_eq!(summary.wrong_answers.len(), 1);
        assert_eq!(summary.wrong_answers[0].plant.id, q.plant.id);
        assert_eq!(summary.wrong_answers[0].chosen_text, chosen_text);
        assert!(!summary.is_perfect());
    }

    #[test]
    fn test_double_submit_is_ignored() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();
        let q = question(&mut engine, &mut progress, &catalog, t0());
        engine
            .submit_answer(correct_index(&q), t0(), &mut progress, &mut analytics)
            .unwrap();
        let score = engine.score();

        assert!(engine
            .submit_answer(correct_index(&q), t0(), &mut progress, &mut analytics)
            .is_none());
        assert_eq!(engine.score(), score);
        assert_eq!(engine.phase(), Phase::Answered);
    }

    #[test]
    fn test_submit_without_question_is_ignored() {
        let (_, mut progress, mut analytics, mut engine) = fixture();
        assert!(engine
            .submit_answer(0, t0(), &mut progress, &mut analytics)
            .is_none());
    }

    #[test]
    fn test_hint_once_per_question() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();
        let q = question(&mut engine, &mut progress, &catalog, t0());
        assert!(engine.use_hint().is_some());
        assert!(engine.use_hint().is_none());

        engine
            .submit_answer(correct_index(&q), t0(), &mut progress, &mut analytics)
            .unwrap();
        assert!(engine.use_hint().is_none());
    }

    #[test]
    fn test_eliminated_options_unselectable() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();
        let q = question(&mut engine, &mut progress, &catalog, t0());
        let eliminated = engine.use_hint().unwrap();

        assert!(engine
            .submit_answer(eliminated[0], t0(), &mut progress, &mut analytics)
            .is_none());
        // The question is still answerable afterwards.
        assert!(engine
            .submit_answer(correct_index(&q), t0(), &mut progress, &mut analytics)
            .is_some());
    }

    #[test]
    fn test_round_emits_n_questions_and_one_summary() {
        let (catalog, mut progress, mut analytics, mut engine) = fixture();

        let mut questions = 0;
        loop {
            match engine.next_question(&mut progress, &catalog, t0()) {
                Some(RoundEvent::Question(q)) => {
                    questions += 1;
                    assert_eq!(q.question_number, questions);
                    assert_eq!(q.total_questions, 10);
                    assert_eq!(q.options.len(), 4);
                    engine
                        .submit_answer(correct_index(&q), t0(), &mut progress, &mut analytics)
                        .unwrap();
                }
                Some(RoundEvent::Complete(summary)) => {
                    assert_eq!(questions, engine.total_questions());
                    assert_eq!(summary.correct_count + summary.wrong_count, 10);
                    assert_eq!(summary.correct_count, 10);
                    assert!(summary.is_perfect());
                    assert!(summary.is_new_high_score);
                    break;
                }
                None => panic!("engine stalled"),
            }
        }
        assert!(engine.is_complete());
        assert_eq!(engine.asked_ids().len(), 10);
        assert_eq!(progress.profile().games_played, 1);

        // Completion is idempotent: same summary, nothing re-recorded.
        match engine.next_question(&mut progress, &catalog, t0()) {
            Some(RoundEvent::Complete(summary)) => {
                assert_eq!(summary.correct_count, 10);
            }
            other => panic!("expected summary, got {other:?}"),
        }
        assert_eq!(progress.profile().games_played, 1);
    }

    #[test]
    fn test_next_question_noop_while_active() {
        let (catalog, mut progress, _analytics, mut engine) = fixture();
        let _q = question(&mut engine, &mut progress, &catalog, t0());
        assert!(engine.next_question(&mut progress, &catalog, t0()).is_none());
        assert_eq!(engine.question_number(), 1);
    }

    #[test]
    fn test_advance_slot_fires_once() {
        let mut slot = AdvanceSlot::new();
        assert!(!slot.fire(t0()));

        slot.arm(t0() + Duration::milliseconds(3500));
        assert!(slot.is_armed());
        assert!(!slot.fire(t0() + Duration::milliseconds(3499)));
        assert!(slot.fire(t0() + Duration::milliseconds(3500)));
        // Disarmed after firing: at most one advance per question.
        assert!(!slot.fire(t0() + Duration::milliseconds(9999)));
    }

    #[test]
    fn test_advance_slot_rearm_and_cancel() {
        let mut slot = AdvanceSlot::new();
        slot.arm(t0() + Duration::milliseconds(1000));
        // Re-arming replaces the pending deadline.
        slot.arm(t0() + Duration::milliseconds(5000));
        assert!(!slot.fire(t0() + Duration::milliseconds(1000)));

        slot.cancel();
        assert!(!slot.is_armed());
        assert!(!slot.fire(t0() + Duration::milliseconds(9000)));
    }
}
