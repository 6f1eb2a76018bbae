//! A running game: the state machine plus its RNG, persistence and the
//! paced command pump.
//!
//! Time is injected as a monotonic [`Duration`] since any fixed epoch, so
//! the same driver works under a native event loop, a browser
//! `requestAnimationFrame` callback, or a test.
//!
//! `Game` is single-owner. A multi-threaded host must put it behind a mutex
//! so each transition runs as one critical section.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::snapshot::SavedGame;
use crate::state::{reduce, Action, GameState};
use crate::storage::SnapshotStore;
use crate::Direction;

/// Pause after each applied move before the next queued command starts.
pub const MOVE_DELAY: Duration = Duration::from_millis(150);

pub struct Game<S: SnapshotStore> {
    state: Arc<GameState>,
    rng: SmallRng,
    store: S,
    move_delay: Duration,
    finish_due: Option<Duration>,
}

impl<S: SnapshotStore> Game<S> {
    /// Start a fresh game, ignoring anything in `store`.
    pub fn new(seed: u64, store: S) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let state = GameState::new(&mut rng);
        Self::with_parts(state, rng, store)
    }

    /// Continue from an explicit state, e.g. a fixture or an imported game.
    pub fn from_state(state: GameState, seed: u64, store: S) -> Self {
        Self::with_parts(state, SmallRng::seed_from_u64(seed), store)
    }

    /// Resume the game saved in `store`, or start fresh.
    ///
    /// A snapshot that fails to decode is discarded from the store; storage
    /// failures are logged and never prevent a game from starting.
    pub fn restore(seed: u64, mut store: S) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let state = match store.load() {
            Ok(Some(raw)) => match SavedGame::decode(&raw) {
                Ok(saved) => {
                    info!("resumed saved game at score {}", saved.score);
                    saved.into_state()
                }
                Err(err) => {
                    warn!("discarding saved game: {err}");
                    if let Err(err) = store.clear() {
                        warn!("could not discard saved game: {err}");
                    }
                    GameState::new(&mut rng)
                }
            },
            Ok(None) => GameState::new(&mut rng),
            Err(err) => {
                warn!("could not read saved game: {err}");
                GameState::new(&mut rng)
            }
        };
        Self::with_parts(state, rng, store)
    }

    fn with_parts(state: GameState, rng: SmallRng, store: S) -> Self {
        Game {
            state: Arc::new(state),
            rng,
            store,
            move_delay: MOVE_DELAY,
            finish_due: None,
        }
    }

    pub fn with_move_delay(mut self, move_delay: Duration) -> Self {
        self.move_delay = move_delay;
        self
    }

    pub fn state(&self) -> &Arc<GameState> {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    /// When the host should call [`Game::tick`] next, if anything is pending.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.finish_due
    }

    /// Apply one action and its side effects. Returns whether the state
    /// changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let next = reduce(&self.state, action, &mut self.rng);
        if Arc::ptr_eq(&next, &self.state) {
            return false;
        }
        self.state = next;

        match action {
            Action::NewGame => {
                self.finish_due = None;
                info!("new game");
                if let Err(err) = self.store.clear() {
                    warn!("could not discard saved game: {err}");
                }
            }
            Action::Move(_) | Action::Undo => self.persist(),
            Action::QueueCommand(_) | Action::StartProcessing | Action::FinishProcessing => {}
        }
        true
    }

    /// Queue a direction and start it right away if nothing is in flight.
    /// Returns false when the queue was full and the command was dropped.
    pub fn queue_command(&mut self, direction: Direction, now: Duration) -> bool {
        let queued = self.dispatch(Action::QueueCommand(direction));
        self.pump(now);
        queued
    }

    /// Advance the pacing clock.
    pub fn tick(&mut self, now: Duration) {
        self.pump(now);
    }

    /// Abandon queued commands and any pending finish, then deal a new board.
    pub fn new_game(&mut self) {
        self.dispatch(Action::NewGame);
    }

    pub fn undo(&mut self) -> bool {
        self.dispatch(Action::Undo)
    }

    fn pump(&mut self, now: Duration) {
        if let Some(due) = self.finish_due {
            if now < due {
                return;
            }
            self.finish_due = None;
            self.dispatch(Action::FinishProcessing);
        }

        if self.state.is_processing_command {
            return;
        }
        let Some(&direction) = self.state.command_queue.front() else {
            return;
        };

        self.dispatch(Action::StartProcessing);
        self.dispatch(Action::Move(direction));
        self.finish_due = Some(now.saturating_add(self.move_delay));
    }

    fn persist(&mut self) {
        let encoded = match SavedGame::from(self.state.as_ref()).encode() {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!("could not encode game: {err}");
                return;
            }
        };
        if let Err(err) = self.store.save(&encoded) {
            warn!("could not save game: {err}");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
