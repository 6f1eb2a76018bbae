//! Input policy shared by front ends: swipe classification and the overlay
//! gate that decides when movement commands may be queued.

use crate::status::GameStatus;
use crate::Direction;

/// A swipe shorter than this along its dominant axis is ignored.
pub const MIN_SWIPE_DISTANCE: f64 = 50.0;

/// Classify a touch gesture by its displacement. Ties go to the vertical
/// axis; positive `dy` points down.
pub fn swipe_direction(dx: f64, dy: f64) -> Option<Direction> {
    if dx.abs() < MIN_SWIPE_DISTANCE && dy.abs() < MIN_SWIPE_DISTANCE {
        return None;
    }

    if dx.abs() > dy.abs() {
        Some(if dx > 0.0 { Direction::Right } else { Direction::Left })
    } else {
        Some(if dy > 0.0 { Direction::Down } else { Direction::Up })
    }
}

/// Blocking dialogs a front end can show over the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    Win,
    Lose,
    ConfirmNewGame,
}

/// Tracks the open overlay. Movement is blocked only while an overlay is
/// open; after dismissing the win overlay the player keeps playing.
#[derive(Debug, Clone, Default)]
pub struct InputGate {
    overlay: Option<Overlay>,
    last_status: GameStatus,
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate for a game already in `status`, e.g. one just restored. No
    /// overlay opens until the status changes.
    pub fn with_status(status: GameStatus) -> Self {
        InputGate {
            overlay: None,
            last_status: status,
        }
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn accepts_movement(&self) -> bool {
        self.overlay.is_none()
    }

    /// `Some(direction)` if it may be queued right now.
    pub fn filter(&self, direction: Direction) -> Option<Direction> {
        self.accepts_movement().then_some(direction)
    }

    pub fn open(&mut self, overlay: Overlay) {
        self.overlay = Some(overlay);
    }

    pub fn dismiss(&mut self) {
        self.overlay = None;
    }

    /// Feed the current status after every state change. Entering win or
    /// lose opens the matching overlay and returns it; leaving them (new
    /// game, undo) closes it.
    pub fn observe(&mut self, status: GameStatus) -> Option<Overlay> {
        let previous = std::mem::replace(&mut self.last_status, status);
        if previous == status {
            return None;
        }

        match status {
            GameStatus::Win => {
                self.overlay = Some(Overlay::Win);
                self.overlay
            }
            GameStatus::Lose => {
                self.overlay = Some(Overlay::Lose);
                self.overlay
            }
            GameStatus::Idle | GameStatus::Playing => {
                if matches!(self.overlay, Some(Overlay::Win | Overlay::Lose)) {
                    self.overlay = None;
                }
                None
            }
        }
    }
}
