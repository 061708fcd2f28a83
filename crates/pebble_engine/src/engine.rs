use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pebble_core::{Generation, Symbol};
use pebble_logging::{pebble_debug, pebble_error, pebble_info};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EngineStopped, QuoteSource};

/// How long shutdown waits for blocking work such as DNS lookups.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

enum EngineCommand {
    Fetch {
        generation: Generation,
        symbols: Vec<Symbol>,
    },
    Search {
        generation: Generation,
        text: String,
    },
    StartTimer {
        period: Duration,
    },
    StopTimer,
    Shutdown,
}

/// Owns the engine thread and its tokio runtime.
///
/// Dropping the handle shuts the engine down: the refresh timer is cancelled,
/// requests in flight are abandoned and the thread is joined.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    root_token: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(source: QuoteSource) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let root_token = CancellationToken::new();
        let root = root_token.clone();

        let thread = thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    pebble_error!("failed to start engine runtime: {}", err);
                    return;
                }
            };
            let mut timer: Option<CancellationToken> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartTimer { period } => {
                        if let Some(previous) = timer.take() {
                            previous.cancel();
                        }
                        let token = root.child_token();
                        runtime.spawn(run_timer(period, token.clone(), event_tx.clone()));
                        timer = Some(token);
                    }
                    EngineCommand::StopTimer => {
                        if let Some(previous) = timer.take() {
                            previous.cancel();
                        }
                    }
                    EngineCommand::Shutdown => break,
                    command => {
                        let source = source.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_command(&source, command, event_tx).await;
                        });
                    }
                }
            }
            root.cancel();
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
            pebble_debug!("engine thread stopped");
        });

        Self {
            cmd_tx,
            event_rx,
            root_token,
            thread: Some(thread),
        }
    }

    pub fn fetch(&self, generation: Generation, symbols: Vec<Symbol>) -> Result<(), EngineStopped> {
        self.send(EngineCommand::Fetch {
            generation,
            symbols,
        })
    }

    pub fn search(&self, generation: Generation, text: impl Into<String>) -> Result<(), EngineStopped> {
        self.send(EngineCommand::Search {
            generation,
            text: text.into(),
        })
    }

    /// Starts (or restarts) the refresh timer. The first tick fires one
    /// `period` from now.
    pub fn start_timer(&self, period: Duration) -> Result<(), EngineStopped> {
        pebble_info!("refresh timer every {:?}", period);
        self.send(EngineCommand::StartTimer { period })
    }

    pub fn stop_timer(&self) -> Result<(), EngineStopped> {
        self.send(EngineCommand::StopTimer)
    }

    /// Cancels the timer, stops the engine thread and waits for it to exit.
    /// Every later command fails with `EngineStopped`.
    pub fn shutdown(&mut self) {
        self.root_token.cancel();
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                pebble_error!("engine thread panicked");
            }
        }
    }

    /// Whether the engine thread is still accepting commands.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineStopped> {
        self.cmd_tx.send(command).map_err(|_| EngineStopped)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_timer(period: Duration, token: CancellationToken, event_tx: mpsc::Sender<EngineEvent>) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                if event_tx.send(EngineEvent::TimerFired).is_err() {
                    break;
                }
            }
        }
    }
    pebble_debug!("refresh timer cancelled");
}

async fn handle_command(
    source: &QuoteSource,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Fetch {
            generation,
            symbols,
        } => EngineEvent::QuotesFetched {
            generation,
            result: source.fetch_quotes(&symbols).await,
        },
        EngineCommand::Search { generation, text } => EngineEvent::SearchCompleted {
            generation,
            quotes: source.search_quotes(&text).await,
        },
        EngineCommand::StartTimer { .. }
        | EngineCommand::StopTimer
        | EngineCommand::Shutdown => return,
    };
    let _ = event_tx.send(event);
}
