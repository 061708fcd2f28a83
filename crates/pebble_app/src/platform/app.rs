use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use pebble_core::{update, BoardState, Msg};
use pebble_logging::{pebble_info, pebble_warn};

use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::ui::commands::{self, Command, HELP};
use super::ui::render::render;

/// How long the loop waits for input before draining engine events again.
const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = config::load(config_path.as_deref())?;
    logging::initialize(config.log_destination, config.log_level()?);

    let symbols = config.symbols()?;
    pebble_info!(
        "starting with {} symbols, refresh every {:?}",
        symbols.len(),
        config.refresh_interval()
    );

    let runner = EffectRunner::new(config.provider_settings())?;
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

    // Stdin reader; EOF counts as quit.
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(command) = commands::parse(&line) {
                if cmd_tx.send(command).is_err() {
                    return;
                }
            }
        }
        let _ = cmd_tx.send(Command::Quit);
    });

    let mut board = Board::new(BoardState::new(symbols), runner);
    println!("{HELP}");
    board.dispatch(Msg::RefreshRequested);
    board.runner.start_timer(config.refresh_interval())?;

    loop {
        board.process_engine_events();
        match cmd_rx.recv_timeout(POLL_INTERVAL) {
            Ok(Command::Dispatch(msg)) => board.dispatch(msg),
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Unknown(input)) => println!("unknown command {input:?}; type 'help'"),
            Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    pebble_info!("shutting down");
    board.runner.shutdown();
    Ok(())
}

/// Board state plus the runner that executes its effects.
struct Board {
    state: BoardState,
    runner: EffectRunner,
}

impl Board {
    fn new(state: BoardState, runner: EffectRunner) -> Self {
        Self { state, runner }
    }

    fn process_engine_events(&mut self) {
        for msg in self.runner.poll() {
            self.dispatch(msg);
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let mut pending = VecDeque::from([msg]);
        while let Some(msg) = pending.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            pending.extend(self.runner.enqueue(effects));
            if state.consume_dirty() {
                self.draw(&state);
            }
            self.state = state;
        }
    }

    fn draw(&self, state: &BoardState) {
        let mut stdout = io::stdout().lock();
        if let Err(err) = writeln!(stdout, "\n{}", render(&state.view())).and_then(|_| stdout.flush()) {
            pebble_warn!("failed to draw board: {}", err);
        }
    }
}
