//! Application state: wires the quiz engine to the terminal UI.

use crate::analytics::DifficultyTracker;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::models::{AnswerResolved, QuestionReady, RoundSummary};
use crate::progress::ProgressStore;
use crate::round::{AdvanceSlot, Phase, RoundEngine, RoundEvent};
use crate::selection::SelectionEngine;
use crate::store::{MemoryStore, SharedStore, SqliteStore};
use chrono::{DateTime, Duration, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use std::rc::Rc;
use tracing::warn;

/// Current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Title screen with player stats and settings.
    Menu,
    /// A round in progress.
    Quiz,
    /// End-of-round summary.
    Results,
    /// Plant collection and difficulty ranking.
    Collection,
}

/// Application state.
pub struct App {
    pub config: Config,
    pub catalog: Catalog,
    pub progress: ProgressStore,
    pub analytics: DifficultyTracker,
    pub view: View,
    /// Engine for the round in progress, if any.
    round: Option<RoundEngine>,
    /// The question currently on screen.
    pub question: Option<QuestionReady>,
    /// Resolution of the current question, once answered.
    pub resolution: Option<AnswerResolved>,
    /// Option indices removed by the hint.
    pub eliminated: Vec<usize>,
    /// Index the player picked.
    pub chosen: Option<usize>,
    pub summary: Option<RoundSummary>,
    advance: AdvanceSlot,
    pub message: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::load();

        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_file(path)?,
            None => Catalog::builtin(),
        };

        let store = open_store();
        let mut progress = ProgressStore::load(store.clone(), &catalog, config.progress_rules());
        progress.update_daily_streak(Utc::now());
        let analytics = DifficultyTracker::load(store);

        Ok(Self {
            config,
            catalog,
            progress,
            analytics,
            view: View::Menu,
            round: None,
            question: None,
            resolution: None,
            eliminated: Vec::new(),
            chosen: None,
            summary: None,
            advance: AdvanceSlot::new(),
            message: None,
            show_help: false,
            should_quit: false,
        })
    }

    /// True while a question is on screen and unanswered.
    pub fn question_active(&self) -> bool {
        self.round
            .as_ref()
            .map_or(false, |r| r.phase() == Phase::QuestionActive)
    }

    /// True once the current question has been answered.
    pub fn answered(&self) -> bool {
        self.round
            .as_ref()
            .map_or(false, |r| r.phase() == Phase::Answered)
    }

    pub fn round_score(&self) -> i64 {
        self.round.as_ref().map_or(0, |r| r.score())
    }

    /// Drive the auto-advance timer; called from the event loop.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.advance.fire(now) {
            self.advance_question(now);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.message = None;

        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.view {
            View::Menu => self.handle_menu_key(key),
            View::Quiz => self.handle_quiz_key(key),
            View::Results => self.handle_results_key(key),
            View::Collection => self.handle_collection_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.start_round(),
            KeyCode::Char('c') => self.view = View::Collection,
            KeyCode::Char('d') => {
                let on = self.progress.toggle_dark_mode();
                self.message = Some(format!("Dark mode {}", if on { "on" } else { "off" }));
            }
            KeyCode::Char('m') => {
                let on = self.progress.toggle_sound();
                self.message = Some(format!("Sound {}", if on { "on" } else { "off" }));
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c @ '1'..='4') => {
                let choice = c as usize - '1' as usize;
                self.submit(choice);
            }
            KeyCode::Char('h') => self.use_hint(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                // Manual continue wins the race against the timer.
                if self.answered() {
                    self.advance.cancel();
                    self.advance_question(Utc::now());
                }
            }
            KeyCode::Esc => self.abandon_round(),
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.start_round(),
            KeyCode::Char('q') | KeyCode::Esc => self.view = View::Menu,
            _ => {}
        }
    }

    fn handle_collection_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.view = View::Menu,
            _ => {}
        }
    }

    fn start_round(&mut self) {
        self.round = Some(RoundEngine::new(
            self.config.scoring_rules(),
            self.config.gameplay.questions_per_round,
            SelectionEngine::new(),
        ));
        self.summary = None;
        self.view = View::Quiz;
        self.advance_question(Utc::now());
    }

    fn abandon_round(&mut self) {
        self.round = None;
        self.question = None;
        self.resolution = None;
        self.eliminated.clear();
        self.chosen = None;
        self.advance.cancel();
        self.view = View::Menu;
    }

    fn advance_question(&mut self, now: DateTime<Utc>) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        match round.next_question(&mut self.progress, &self.catalog, now) {
            Some(RoundEvent::Question(question)) => {
                self.question = Some(question);
                self.resolution = None;
                self.eliminated.clear();
                self.chosen = None;
            }
            Some(RoundEvent::Complete(summary)) => {
                self.summary = Some(summary);
                self.round = None;
                self.question = None;
                self.resolution = None;
                self.eliminated.clear();
                self.chosen = None;
                self.advance.cancel();
                self.view = View::Results;
            }
            None => {}
        }
    }

    fn submit(&mut self, choice: usize) {
        let now = Utc::now();
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if let Some(resolution) =
            round.submit_answer(choice, now, &mut self.progress, &mut self.analytics)
        {
            self.chosen = Some(choice);
            self.resolution = Some(resolution);
            let delay = self.config.gameplay.auto_advance_delay_ms;
            self.advance.arm(now + Duration::milliseconds(delay as i64));
        }
    }

    fn use_hint(&mut self) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if let Some(eliminated) = round.use_hint() {
            self.eliminated = eliminated;
        }
    }
}

/// Open the on-disk store, falling back to a session-only in-memory store
/// if the data directory is unusable.
fn open_store() -> SharedStore {
    if let Some(path) = Config::db_path() {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match SqliteStore::open(&path) {
            Ok(store) => return Rc::new(store),
            Err(e) => warn!(error = %e, "could not open database, progress will not persist"),
        }
    }
    Rc::new(MemoryStore::new())
}
