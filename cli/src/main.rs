//! # 2048 CLI
//!
//! Play 2048 in the terminal. Keys are read on a background thread and fed
//! to the engine's paced command queue; the game is saved to a JSON file
//! after every move and resumed on the next start.

mod store;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;
use merge_2048_core::{
    Direction, Game, GameStatus, InputGate, NoStore, Overlay, SnapshotStore, STORAGE_KEY,
};

use crate::store::JsonFileStore;

#[derive(Parser, Debug)]
#[command(name = "merge-2048")]
#[command(author, version, about = "Play 2048 in the terminal")]
struct Args {
    /// Random seed for deterministic runs (defaults to the clock)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where the game is saved between runs
    #[arg(long, value_name = "PATH")]
    save_file: Option<PathBuf>,

    /// Do not load or save the game
    #[arg(long)]
    no_save: bool,

    /// Pause between queued moves, in milliseconds
    #[arg(long, default_value = "150")]
    move_delay_ms: u64,

    /// Log filter when RUST_LOG is unset (logs go to stderr)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    let seed = args.seed.unwrap_or_else(clock_seed);
    let store: Box<dyn SnapshotStore> = if args.no_save {
        Box::new(NoStore)
    } else {
        let path = args
            .save_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{STORAGE_KEY}.json")));
        info!("saving to {}", path.display());
        Box::new(JsonFileStore::new(path))
    };
    info!("seed {seed}");

    let game = Game::restore(seed, store).with_move_delay(Duration::from_millis(args.move_delay_ms));
    run_interactive(game)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive<S: SnapshotStore>(mut game: Game<S>) -> anyhow::Result<()> {
    // Set terminal to raw mode for single-key input
    let _raw = RawMode::enable();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || read_keys(tx));

    let clock = Instant::now();
    let mut gate = InputGate::with_status(game.state().status);
    render(&game, &gate)?;

    loop {
        let Some(input) = next_input(&rx, &game, clock) else {
            break;
        };

        let before = Arc::clone(game.state());
        let overlay_before = gate.overlay();

        if let Some(input) = input {
            if handle_input(input, &mut game, &mut gate, clock.elapsed()) == Flow::Quit {
                break;
            }
        }
        game.tick(clock.elapsed());
        gate.observe(game.state().status);

        if !Arc::ptr_eq(&before, game.state()) || overlay_before != gate.overlay() {
            render(&game, &gate)?;
        }
    }

    println!("\r\nGoodbye!\r");
    Ok(())
}

/// Wait for a key or the next pacing deadline. The outer `None` means the
/// key reader is gone.
fn next_input<S: SnapshotStore>(
    rx: &Receiver<InputAction>,
    game: &Game<S>,
    clock: Instant,
) -> Option<Option<InputAction>> {
    match game.next_deadline() {
        Some(due) => match rx.recv_timeout(due.saturating_sub(clock.elapsed())) {
            Ok(input) => Some(Some(input)),
            Err(RecvTimeoutError::Timeout) => Some(None),
            Err(RecvTimeoutError::Disconnected) => None,
        },
        None => rx.recv().ok().map(Some),
    }
}

fn read_keys(tx: Sender<InputAction>) {
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];
    loop {
        let bytes_read = match stdin.read(&mut buffer) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        let action = parse_input(&buffer[..bytes_read]);
        if action != InputAction::None && tx.send(action).is_err() {
            return;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Route one key through the overlay gate. While an overlay is open only
/// its own keys work.
fn handle_input<S: SnapshotStore>(
    input: InputAction,
    game: &mut Game<S>,
    gate: &mut InputGate,
    now: Duration,
) -> Flow {
    if input == InputAction::Quit {
        return Flow::Quit;
    }

    match (gate.overlay(), input) {
        (Some(Overlay::ConfirmNewGame), InputAction::Confirm) => {
            game.new_game();
            gate.dismiss();
        }
        (Some(_), InputAction::Dismiss) => gate.dismiss(),
        (Some(_), _) => {}
        (None, InputAction::Move(direction)) => {
            if let Some(direction) = gate.filter(direction) {
                game.queue_command(direction, now);
            }
        }
        (None, InputAction::Undo) => {
            game.undo();
        }
        (None, InputAction::NewGame) => gate.open(Overlay::ConfirmNewGame),
        (None, _) => {}
    }
    Flow::Continue
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputAction {
    Move(Direction),
    Undo,
    NewGame,
    Confirm,
    Dismiss,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        [b'u'] | [b'U'] => InputAction::Undo,
        [b'n'] | [b'N'] => InputAction::NewGame,
        [b'y'] | [b'Y'] => InputAction::Confirm,
        [b'c'] | [b'C'] | [b'\r'] | [b'\n'] | [27] => InputAction::Dismiss,

        // q, Q, Ctrl+C
        [b'q'] | [b'Q'] | [3] => InputAction::Quit,

        _ => InputAction::None,
    }
}

fn render<S: SnapshotStore>(game: &Game<S>, gate: &InputGate) -> anyhow::Result<()> {
    let state = game.state();
    let mut out = String::new();
    out.push_str("\x1b[2J\x1b[H");
    out.push_str("=== 2048 ===\n");
    out.push_str("Arrows/WASD move | U undo | N new game | Q quit\n\n");
    out.push_str(&state.to_string());

    let undo_hint = if game.can_undo() { "available" } else { "unavailable" };
    out.push_str(&format!("\n  Undo: {undo_hint}\n"));

    match gate.overlay() {
        Some(Overlay::Win) => {
            out.push_str("\n  *** YOU WIN! ***\n  Press C to keep playing or Q to quit\n");
        }
        Some(Overlay::Lose) => {
            out.push_str("\n  *** GAME OVER ***\n");
            out.push_str(&format!("  Final Score: {}\n", state.score));
            out.push_str(&format!("  Max Tile: {}\n", state.max_tile()));
            out.push_str("  Press C to close, then N for a new game\n");
        }
        Some(Overlay::ConfirmNewGame) => {
            out.push_str("\n  Start a new game? Progress will be lost. (Y/C)\n");
        }
        None if state.status == GameStatus::Win => out.push_str("\n  2048 reached, keep going!\n"),
        None if state.status == GameStatus::Lose => {
            out.push_str("\n  No moves left. Press N for a new game\n");
        }
        None => {}
    }

    // Raw mode disables output post-processing, so newlines need a carriage return.
    let out = out.replace('\n', "\r\n");
    let mut stdout = io::stdout();
    stdout.write_all(out.as_bytes()).context("writing to terminal")?;
    stdout.flush().context("flushing terminal")?;
    Ok(())
}

/// Puts the terminal into raw mode and restores the previous settings on drop.
struct RawMode {
    #[cfg(unix)]
    saved: Option<libc::termios>,
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
impl RawMode {
    fn enable() -> Self {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdin().as_raw_fd();
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut termios) != 0 {
                return RawMode { saved: None };
            }
            let saved = termios;
            termios.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
            libc::tcsetattr(fd, libc::TCSANOW, &termios);
            RawMode { saved: Some(saved) }
        }
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;
        if let Some(saved) = self.saved {
            unsafe {
                libc::tcsetattr(io::stdin().as_raw_fd(), libc::TCSANOW, &saved);
            }
        }
    }
}

#[cfg(not(unix))]
impl RawMode {
    fn enable() -> Self {
        // On non-Unix systems, just continue without raw mode
        // Interactive mode will require Enter after each key
        RawMode {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merge_2048_core::{GameState, MemoryStore, Tile, TileId};

    fn game_with_pair() -> Game<MemoryStore> {
        let state = GameState {
            tiles: vec![
                Tile::new(TileId::nil(), 2, 0, 0),
                Tile::new(TileId::nil(), 2, 1, 0),
            ],
            status: GameStatus::Playing,
            ..GameState::default()
        };
        Game::from_state(state, 3, MemoryStore::default())
    }

    #[test]
    fn test_parse_arrows_and_wasd() {
        assert_eq!(parse_input(&[27, 91, 68]), InputAction::Move(Direction::Left));
        assert_eq!(parse_input(&[27, 91, 65]), InputAction::Move(Direction::Up));
        assert_eq!(parse_input(b"d"), InputAction::Move(Direction::Right));
        assert_eq!(parse_input(b"S"), InputAction::Move(Direction::Down));
    }

    #[test]
    fn test_parse_control_keys() {
        assert_eq!(parse_input(b"u"), InputAction::Undo);
        assert_eq!(parse_input(b"n"), InputAction::NewGame);
        assert_eq!(parse_input(b"y"), InputAction::Confirm);
        assert_eq!(parse_input(&[27]), InputAction::Dismiss);
        assert_eq!(parse_input(&[3]), InputAction::Quit);
        assert_eq!(parse_input(b"z"), InputAction::None);
    }

    #[test]
    fn test_move_is_queued_without_overlay() {
        let mut game = game_with_pair();
        let mut gate = InputGate::new();

        let flow = handle_input(
            InputAction::Move(Direction::Left),
            &mut game,
            &mut gate,
            Duration::ZERO,
        );

        assert_eq!(flow, Flow::Continue);
        assert_eq!(game.state().score, 4);
    }

    #[test]
    fn test_overlay_swallows_moves() {
        let mut game = game_with_pair();
        let mut gate = InputGate::new();
        gate.open(Overlay::Win);

        handle_input(InputAction::Move(Direction::Left), &mut game, &mut gate, Duration::ZERO);
        assert_eq!(game.state().score, 0);

        handle_input(InputAction::Dismiss, &mut game, &mut gate, Duration::ZERO);
        handle_input(InputAction::Move(Direction::Left), &mut game, &mut gate, Duration::ZERO);
        assert_eq!(game.state().score, 4);
    }

    #[test]
    fn test_new_game_needs_confirmation() {
        let mut game = game_with_pair();
        let mut gate = InputGate::new();
        handle_input(InputAction::Move(Direction::Left), &mut game, &mut gate, Duration::ZERO);

        handle_input(InputAction::NewGame, &mut game, &mut gate, Duration::ZERO);
        assert_eq!(gate.overlay(), Some(Overlay::ConfirmNewGame));
        assert_eq!(game.state().score, 4);

        handle_input(InputAction::Confirm, &mut game, &mut gate, Duration::ZERO);
        assert_eq!(gate.overlay(), None);
        assert_eq!(game.state().score, 0);
        assert!(game.state().command_queue.is_empty());
    }

    #[test]
    fn test_moves_work_after_resuming_a_won_game() {
        let state = GameState {
            tiles: vec![
                Tile::new(TileId::nil(), 2048, 0, 0),
                Tile::new(TileId::nil(), 2, 3, 0),
            ],
            status: GameStatus::Win,
            ..GameState::default()
        };
        let mut game = Game::from_state(state, 3, MemoryStore::default());
        let mut gate = InputGate::with_status(game.state().status);

        handle_input(InputAction::Move(Direction::Left), &mut game, &mut gate, Duration::ZERO);
        gate.observe(game.state().status);

        assert_eq!(gate.overlay(), None);
        assert_eq!(game.state().status, GameStatus::Win);
        assert_eq!(game.state().tiles.len(), 3);
    }

    #[test]
    fn test_quit_always_wins() {
        let mut game = game_with_pair();
        let mut gate = InputGate::new();
        gate.open(Overlay::Lose);
        assert_eq!(
            handle_input(InputAction::Quit, &mut game, &mut gate, Duration::ZERO),
            Flow::Quit
        );
    }
}
