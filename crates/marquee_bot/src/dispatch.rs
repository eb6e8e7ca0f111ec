//! Fan inbound events out to the engine.
//!
//! Each user gets a FIFO queue drained by one worker task, so events from one
//! user reach the engine in arrival order while different users proceed
//! concurrently. A worker retires as soon as its queue is empty. Inline
//! queries carry no session state and skip the queues.

use crate::Engine;
use marquee_interface::{Inbound, InboundPayload, UserId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument};

type Queues = Arc<Mutex<HashMap<UserId, UnboundedSender<Inbound>>>>;

/// Routes inbound events to per-user workers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    engine: Arc<Engine>,
    queues: Queues,
}

impl Dispatcher {
    /// Create a dispatcher over `engine`.
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            queues: Arc::default(),
        }
    }

    /// Number of users with a live worker.
    pub fn active_users(&self) -> usize {
        self.queues.lock().len()
    }

    /// Queue `inbound` behind earlier events from the same user.
    ///
    /// Returns the handle of the task started for it, or `None` when the
    /// user's worker was already running and took the event.
    pub fn dispatch(&self, inbound: Inbound) -> Option<JoinHandle<()>> {
        self.route(inbound).map(tokio::spawn)
    }

    /// Dispatch events until every sender is dropped, then wait for the
    /// workers to drain.
    #[instrument(skip_all)]
    pub async fn run(self, mut rx: mpsc::Receiver<Inbound>) {
        let mut workers = JoinSet::new();
        loop {
            tokio::select! {
                inbound = rx.recv() => match inbound {
                    Some(inbound) => {
                        if let Some(task) = self.route(inbound) {
                            workers.spawn(task);
                        }
                    }
                    None => break,
                },
                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Dispatch worker failed");
                    }
                }
            }
        }
        info!(workers = workers.len(), "Inbound channel closed, draining workers");
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Dispatch worker failed");
            }
        }
    }

    /// Enqueue `inbound`; the task to spawn when no worker holds its queue.
    fn route(&self, inbound: Inbound) -> Option<impl Future<Output = ()> + Send + 'static> {
        if matches!(inbound.payload, InboundPayload::InlineQuery { .. }) {
            let engine = Arc::clone(&self.engine);
            return Some(Task::Inline(engine, inbound).run(Arc::clone(&self.queues)));
        }

        let user = inbound.user;
        let mut queues = self.queues.lock();
        let inbound = match queues.get(&user) {
            Some(queue) => match queue.send(inbound) {
                Ok(()) => return None,
                Err(mpsc::error::SendError(inbound)) => inbound,
            },
            None => inbound,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let first = Some(inbound);
        queues.insert(user, tx);
        debug!(user_id = %user, "Starting dispatch worker");
        let engine = Arc::clone(&self.engine);
        Some(Task::Queue { engine, user, first, rx }.run(Arc::clone(&self.queues)))
    }
}

enum Task {
    Inline(Arc<Engine>, Inbound),
    Queue {
        engine: Arc<Engine>,
        user: UserId,
        first: Option<Inbound>,
        rx: UnboundedReceiver<Inbound>,
    },
}

impl Task {
    async fn run(self, queues: Queues) {
        match self {
            Task::Inline(engine, inbound) => handle(&engine, inbound).await,
            Task::Queue {
                engine,
                user,
                mut first,
                mut rx,
            } => {
                while let Some(inbound) = first
                    .take()
                    .or_else(|| next_or_retire(&queues, user, &mut rx))
                {
                    handle(&engine, inbound).await;
                }
                debug!(user_id = %user, "Dispatch worker retired");
            }
        }
    }
}

/// Next queued event, or `None` after removing the user's queue.
///
/// Senders only push while holding the map lock, so an empty queue observed
/// under that lock stays empty once the entry is gone.
fn next_or_retire(
    queues: &Mutex<HashMap<UserId, UnboundedSender<Inbound>>>,
    user: UserId,
    rx: &mut UnboundedReceiver<Inbound>,
) -> Option<Inbound> {
    if let Ok(inbound) = rx.try_recv() {
        return Some(inbound);
    }
    let mut queues = queues.lock();
    match rx.try_recv() {
        Ok(inbound) => Some(inbound),
        Err(_) => {
            queues.remove(&user);
            None
        }
    }
}

async fn handle(engine: &Engine, inbound: Inbound) {
    let user = inbound.user;
    if let Err(e) = engine.handle(inbound).await {
        debug!(user_id = %user, error = %e, "Event finished with an error");
    }
}
