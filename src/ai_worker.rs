//! Background AI worker
//!
//! The search runs on its own thread so the caller stays responsive. The
//! caller talks to it through an [`AiHandle`]: requests go down one channel,
//! responses come back on another. Each search request carries its own
//! [`StopFlag`], so a cancel reaches that request whether it is queued or
//! already running.
//!
//! Every search request carries an id. A response for an id other than the
//! one being waited on is stale and is dropped.

use crate::config::SearchSettings;
use crate::error::{ArenaError, Result};
use crate::game_wrapper::{GameWrapper, MoveWrapper};
use crate::search::{AlphaBeta, SearchLimits, StopFlag};
use crate::GameRules;
use log::{debug, warn};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Messages sent to the AI worker thread
#[derive(Debug)]
pub enum AiRequest {
    /// Find a move for the side to move in `game_state`
    Search {
        request_id: u64,
        game_state: GameWrapper,
        /// Cancels this request only
        stop: StopFlag,
    },
    /// Replace the engine settings; applies from the next search
    UpdateSettings {
        limits: SearchLimits,
        num_threads: usize,
        seed: Option<u64>,
    },
    /// Stop the AI worker thread
    Stop,
}

/// A finished search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReady {
    pub request_id: u64,
    pub best_move: MoveWrapper,
    pub score: i32,
    pub nodes: u64,
    pub completed_depth: u32,
    /// A limit or a cancel cut the search short
    pub stopped: bool,
}

/// Messages received from the AI worker thread
#[derive(Debug, Clone)]
pub enum AiResponse {
    /// The worker started on this request
    Thinking(u64),
    MoveReady(MoveReady),
    Error { request_id: u64, message: String },
}

/// A search request taken off the queue
struct PendingSearch {
    request_id: u64,
    game_state: GameWrapper,
    stop: StopFlag,
}

/// The AI worker that runs in a separate thread
pub struct AiWorker {
    engine: AlphaBeta,
    rng: Xoshiro256PlusPlus,
    /// Highest request id seen; older searches are skipped
    current_request_id: u64,
}

fn make_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
    }
}

impl AiWorker {
    pub fn new(limits: SearchLimits, num_threads: usize, seed: Option<u64>) -> Result<Self> {
        Ok(Self {
            engine: AlphaBeta::with_threads(limits, num_threads)?,
            rng: make_rng(seed),
            current_request_id: 0,
        })
    }

    /// Main loop. Runs until a `Stop` request arrives or either channel closes.
    pub fn run(mut self, rx: Receiver<AiRequest>, tx: Sender<AiResponse>) {
        while let Ok(request) = rx.recv() {
            let pending = match request {
                AiRequest::Search {
                    request_id,
                    game_state,
                    stop,
                } => PendingSearch {
                    request_id,
                    game_state,
                    stop,
                },
                AiRequest::UpdateSettings {
                    limits,
                    num_threads,
                    seed,
                } => {
                    self.apply_settings(limits, num_threads, seed, &tx);
                    continue;
                }
                AiRequest::Stop => break,
            };
            let Some(pending) = self.drain_queue(pending, &rx, &tx) else {
                break;
            };
            if pending.request_id < self.current_request_id {
                warn!("skipping stale search request {}", pending.request_id);
                continue;
            }
            self.current_request_id = pending.request_id;
            if tx.send(AiResponse::Thinking(pending.request_id)).is_err() {
                break;
            }
            let response = self.search(&pending);
            if tx.send(response).is_err() {
                break;
            }
        }
        debug!("AI worker exiting");
    }

    /// Takes everything already queued behind `pending`. A newer search
    /// replaces it and settings updates apply on the spot. Returns `None`
    /// if a `Stop` was queued.
    fn drain_queue(
        &mut self,
        mut pending: PendingSearch,
        rx: &Receiver<AiRequest>,
        tx: &Sender<AiResponse>,
    ) -> Option<PendingSearch> {
        while let Ok(request) = rx.try_recv() {
            match request {
                AiRequest::Search {
                    request_id,
                    game_state,
                    stop,
                } => {
                    debug!(
                        "search request {} superseded by {}",
                        pending.request_id, request_id
                    );
                    pending = PendingSearch {
                        request_id,
                        game_state,
                        stop,
                    };
                }
                AiRequest::UpdateSettings {
                    limits,
                    num_threads,
                    seed,
                } => self.apply_settings(limits, num_threads, seed, tx),
                AiRequest::Stop => return None,
            }
        }
        Some(pending)
    }

    fn apply_settings(
        &mut self,
        limits: SearchLimits,
        num_threads: usize,
        seed: Option<u64>,
        tx: &Sender<AiResponse>,
    ) {
        match AlphaBeta::with_threads(limits, num_threads) {
            Ok(engine) => {
                self.engine = engine;
                if seed.is_some() {
                    self.rng = make_rng(seed);
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("keeping previous search settings: {}", message);
                let _ = tx.send(AiResponse::Error {
                    request_id: self.current_request_id,
                    message,
                });
            }
        }
    }

    fn search(&mut self, pending: &PendingSearch) -> AiResponse {
        let PendingSearch {
            request_id,
            game_state,
            stop,
        } = pending;
        let request_id = *request_id;
        self.engine.set_stop_flag(stop.clone());
        let side = game_state.side_to_move();
        let outcome = self.engine.search(game_state, side, &mut self.rng);
        if outcome.stopped {
            warn!(
                "search {} cut short after depth {} ({} nodes)",
                request_id, outcome.completed_depth, outcome.nodes
            );
        }
        match outcome.best_move {
            Some(best_move) => AiResponse::MoveReady(MoveReady {
                request_id,
                best_move,
                score: outcome.score,
                nodes: outcome.nodes,
                completed_depth: outcome.completed_depth,
                stopped: outcome.stopped,
            }),
            None if game_state.is_terminal() => AiResponse::Error {
                request_id,
                message: "the game is already over".to_string(),
            },
            None => AiResponse::Error {
                request_id,
                message: format!("{} has no legal move", game_state.side_name(side)),
            },
        }
    }
}

/// Owner side of the worker thread.
///
/// Dropping the handle stops the worker and joins its thread.
pub struct AiHandle {
    tx: Sender<AiRequest>,
    rx: Receiver<AiResponse>,
    /// Stop flag of the latest search request
    current_stop: StopFlag,
    next_request_id: u64,
    thread: Option<JoinHandle<()>>,
}

impl AiHandle {
    /// Starts a worker thread configured from `settings`.
    pub fn spawn(settings: &SearchSettings) -> Result<Self> {
        let worker = AiWorker::new(settings.limits(), settings.threads, settings.seed)?;
        let (tx, worker_rx) = mpsc::channel::<AiRequest>();
        let (worker_tx, rx) = mpsc::channel::<AiResponse>();
        let thread = thread::Builder::new()
            .name("ai-worker".to_string())
            .spawn(move || worker.run(worker_rx, worker_tx))?;
        Ok(Self {
            tx,
            rx,
            current_stop: StopFlag::new(),
            next_request_id: 0,
            thread: Some(thread),
        })
    }

    /// Queues a search and returns its id. Cancels the previous request.
    pub fn request_move(&mut self, game_state: GameWrapper) -> Result<u64> {
        self.cancel();
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        let stop = StopFlag::new();
        self.current_stop = stop.clone();
        self.tx
            .send(AiRequest::Search {
                request_id,
                game_state,
                stop,
            })
            .map_err(|_| ArenaError::WorkerDisconnected)?;
        Ok(request_id)
    }

    pub fn update_settings(&self, settings: &SearchSettings) -> Result<()> {
        self.tx
            .send(AiRequest::UpdateSettings {
                limits: settings.limits(),
                num_threads: settings.threads,
                seed: settings.seed,
            })
            .map_err(|_| ArenaError::WorkerDisconnected)
    }

    /// Makes the latest search return its best completed result now, or
    /// return at once if the worker has not picked it up yet.
    pub fn cancel(&self) {
        self.current_stop.stop();
    }

    /// Next response without blocking.
    pub fn try_recv(&self) -> Option<AiResponse> {
        self.rx.try_recv().ok()
    }

    /// Blocks until the result for `request_id` arrives.
    pub fn wait_for_move(&self, request_id: u64) -> Result<MoveReady> {
        loop {
            match self.rx.recv().map_err(|_| ArenaError::WorkerDisconnected)? {
                AiResponse::MoveReady(ready) if ready.request_id == request_id => return Ok(ready),
                AiResponse::MoveReady(ready) => {
                    warn!("ignoring stale result for request {}", ready.request_id);
                }
                AiResponse::Error {
                    request_id: id,
                    message,
                } if id == request_id => {
                    return Err(ArenaError::Search { message });
                }
                AiResponse::Error { message, .. } => warn!("AI worker: {}", message),
                AiResponse::Thinking(id) => debug!("AI thinking on request {}", id),
            }
        }
    }
}

impl Drop for AiHandle {
    fn drop(&mut self) {
        self.cancel();
        let _ = self.tx.send(AiRequest::Stop);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
