//! # 2048 WebAssembly Bindings
//!
//! JavaScript-friendly bindings to the 2048 engine using wasm-bindgen.
//! The page owns the clock and `localStorage`: it passes
//! `performance.now()` into [`WasmGame::queue_command`] and
//! [`WasmGame::tick`], and mirrors [`WasmGame::saved_state`] into storage
//! after each call.

use std::time::Duration;

use merge_2048_core::{
    swipe_direction, Direction, Game, GameState, InputGate, MemoryStore, Overlay, STORAGE_KEY,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Board snapshot handed to the renderer.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsView<'a> {
    #[serde(flatten)]
    state: &'a GameState,
    can_undo: bool,
    overlay: Option<&'static str>,
}

/// WebAssembly wrapper for the 2048 game.
#[wasm_bindgen]
pub struct WasmGame {
    game: Game<MemoryStore>,
    gate: InputGate,
}

#[wasm_bindgen]
impl WasmGame {
    /// Resume from the JSON stored under `storageKey()`, or start fresh when
    /// it is missing or unreadable.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, saved: Option<String>) -> WasmGame {
        let store = match saved {
            Some(raw) => MemoryStore::with_snapshot(raw),
            None => MemoryStore::default(),
        };
        let game = Game::restore(seed, store);
        let gate = InputGate::with_status(game.state().status);
        WasmGame { game, gate }
    }

    /// Queue a move (0=Up, 1=Down, 2=Left, 3=Right). Ignored while an
    /// overlay is open or when the queue is full.
    #[wasm_bindgen(js_name = queueCommand)]
    pub fn queue_command(&mut self, direction: u8, now_ms: f64) -> bool {
        let Some(direction) = Direction::from_u8(direction).and_then(|d| self.gate.filter(d)) else {
            return false;
        };
        let queued = self.game.queue_command(direction, millis(now_ms));
        self.sync_overlay();
        queued
    }

    /// Queue the direction bound to a `KeyboardEvent.key`, if any.
    #[wasm_bindgen(js_name = queueKey)]
    pub fn queue_key(&mut self, key: &str, now_ms: f64) -> bool {
        match Direction::from_key_name(key) {
            Some(direction) => self.queue_command(direction as u8, now_ms),
            None => false,
        }
    }

    /// Queue the direction of a touch swipe, if it was long enough.
    #[wasm_bindgen(js_name = queueSwipe)]
    pub fn queue_swipe(&mut self, dx: f64, dy: f64, now_ms: f64) -> bool {
        match swipe_direction(dx, dy) {
            Some(direction) => self.queue_command(direction as u8, now_ms),
            None => false,
        }
    }

    /// Advance the pacing clock.
    pub fn tick(&mut self, now_ms: f64) {
        self.game.tick(millis(now_ms));
        self.sync_overlay();
    }

    /// When `tick` should run next, or `undefined` when nothing is pending.
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.game
            .next_deadline()
            .map(|due| due.as_nanos() as f64 / 1_000_000.0)
    }

    pub fn undo(&mut self) -> bool {
        if !self.gate.accepts_movement() {
            return false;
        }
        let undone = self.game.undo();
        self.sync_overlay();
        undone
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.game.can_undo()
    }

    /// Ask for confirmation before starting over.
    #[wasm_bindgen(js_name = requestNewGame)]
    pub fn request_new_game(&mut self) {
        self.gate.open(Overlay::ConfirmNewGame);
    }

    /// Start over immediately, dropping queued commands.
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.game.new_game();
        self.gate.dismiss();
        self.sync_overlay();
    }

    /// Close the open overlay. After a win the player keeps playing.
    #[wasm_bindgen(js_name = dismissOverlay)]
    pub fn dismiss_overlay(&mut self) {
        self.gate.dismiss();
    }

    /// "win", "lose", "confirm-new-game" or `undefined`.
    pub fn overlay(&self) -> Option<String> {
        overlay_name(self.gate.overlay()).map(str::to_owned)
    }

    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> u32 {
        self.game.state().score
    }

    #[wasm_bindgen(js_name = getMaxTile)]
    pub fn get_max_tile(&self) -> u32 {
        self.game.state().max_tile()
    }

    /// The full state with tile ids and positions for animation.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        let view = JsView {
            state: self.game.state(),
            can_undo: self.game.can_undo(),
            overlay: overlay_name(self.gate.overlay()),
        };
        serde_wasm_bindgen::to_value(&view).unwrap_or(JsValue::NULL)
    }

    /// JSON to keep in `localStorage`; `undefined` means remove the key.
    #[wasm_bindgen(js_name = savedState)]
    pub fn saved_state(&self) -> Option<String> {
        self.game.store().snapshot.clone()
    }

    fn sync_overlay(&mut self) {
        self.gate.observe(self.game.state().status);
    }
}

/// The `localStorage` key the page should save under.
#[wasm_bindgen(js_name = storageKey)]
pub fn storage_key() -> String {
    STORAGE_KEY.to_owned()
}

fn overlay_name(overlay: Option<Overlay>) -> Option<&'static str> {
    overlay.map(|overlay| match overlay {
        Overlay::Win => "win",
        Overlay::Lose => "lose",
        Overlay::ConfirmNewGame => "confirm-new-game",
    })
}

fn millis(now_ms: f64) -> Duration {
    if now_ms.is_nan() || now_ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(now_ms / 1000.0).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_are_paced() {
        let mut game = WasmGame::new(7, None);
        assert_eq!(game.saved_state(), None);

        assert!(game.queue_command(2, 0.0));
        assert_eq!(game.next_deadline(), Some(150.0));

        game.tick(150.0);
        assert_eq!(game.next_deadline(), None);
    }

    #[test]
    fn test_invalid_direction_is_ignored() {
        let mut game = WasmGame::new(7, None);
        assert!(!game.queue_command(9, 0.0));
        assert!(!game.queue_key("Enter", 0.0));
        assert!(!game.queue_swipe(10.0, 10.0, 0.0));
    }

    #[test]
    fn test_confirm_overlay_blocks_moves() {
        let mut game = WasmGame::new(7, None);
        game.request_new_game();
        assert_eq!(game.overlay().as_deref(), Some("confirm-new-game"));
        assert!(!game.queue_command(2, 0.0));

        game.new_game();
        assert_eq!(game.overlay(), None);
        assert_eq!(game.get_score(), 0);
        assert_eq!(game.saved_state(), None);
    }

    #[test]
    fn test_garbage_save_starts_fresh() {
        let game = WasmGame::new(7, Some("{oops".to_owned()));
        assert_eq!(game.get_score(), 0);
        assert_eq!(game.saved_state(), None);
        assert!(game.get_max_tile() <= 4);
    }

    #[test]
    fn test_millis_clamps_bad_clock_values() {
        assert_eq!(millis(f64::NAN), Duration::ZERO);
        assert_eq!(millis(-5.0), Duration::ZERO);
        assert_eq!(millis(1500.0), Duration::from_millis(1500));
        assert_eq!(millis(1e300), Duration::MAX);
        assert_eq!(millis(f64::INFINITY), Duration::MAX);
    }

    #[test]
    fn test_far_future_clock_does_not_panic() {
        let mut game = WasmGame::new(7, None);
        assert!(game.queue_command(2, 1e300));
        game.tick(1e300);
        game.tick(f64::INFINITY);
    }

    #[test]
    fn test_restored_win_keeps_overlay_closed() {
        let saved = r#"{"tiles":[
            {"id":"00000000-0000-0000-0000-000000000001","value":2048,"x":0,"y":0},
            {"id":"00000000-0000-0000-0000-000000000002","value":2,"x":3,"y":3}
        ],"score":20000,"status":"win","undoCharges":0,"stateHistory":[]}"#;
        let mut game = WasmGame::new(7, Some(saved.to_owned()));

        assert_eq!(game.get_score(), 20000);
        assert_eq!(game.overlay(), None);
        assert!(game.queue_command(2, 0.0));
        game.tick(150.0);
        assert_eq!(game.overlay(), None);
    }
}
