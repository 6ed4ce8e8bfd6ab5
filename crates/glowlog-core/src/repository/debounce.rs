//! Debounced persistence of step reorders.
//!
//! Dragging steps around produces a burst of reorders. Only the last one of a
//! burst needs to reach the store, so each repository owns one worker task
//! holding at most one pending batch. A new batch replaces the pending one and
//! restarts the quiet period; when the period elapses the batch is written.
//!
//! Closing the debouncer (or dropping it) writes whatever is still pending
//! before the worker exits.

use std::{sync::Arc, time::Duration};

use log::{debug, warn};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time,
};

use crate::{
    error::{GlowError, Result},
    models::{OrderUpdate, UserScope},
    store::StepStore,
};

/// Quiet period used when none is configured.
pub const DEFAULT_REORDER_DELAY: Duration = Duration::from_millis(500);

enum ReorderCommand {
    Schedule(Vec<OrderUpdate>),
    Flush(oneshot::Sender<Result<()>>),
}

enum Wake {
    Command(Option<ReorderCommand>),
    Elapsed,
}

/// Handle to a repository's reorder worker.
pub struct ReorderDebouncer {
    commands: mpsc::UnboundedSender<ReorderCommand>,
    worker: JoinHandle<()>,
}

impl ReorderDebouncer {
    /// Starts the worker on the current Tokio runtime.
    pub fn spawn<S>(store: Arc<S>, scope: UserScope, delay: Duration) -> Self
    where
        S: StepStore + ?Sized + 'static,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(store, scope, delay, rx));
        Self { commands, worker }
    }

    /// Queues `orders` for writing, replacing any batch still waiting.
    pub fn schedule(&self, orders: Vec<OrderUpdate>) {
        if self.commands.send(ReorderCommand::Schedule(orders)).is_err() {
            warn!("Reorder worker has stopped; step order will not be saved");
        }
    }

    /// Writes the pending batch now. Returns the store's error, if any.
    pub async fn flush(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(ReorderCommand::Flush(reply))
            .map_err(|_| stopped())?;
        response.await.map_err(|_| stopped())?
    }

    /// Writes the pending batch and waits for the worker to finish.
    pub async fn shutdown(self) -> Result<()> {
        let flushed = self.flush().await;
        drop(self.commands);
        self.worker.await.map_err(GlowError::join)?;
        flushed
    }
}

fn stopped() -> GlowError {
    GlowError::Configuration {
        message: "Reorder worker has stopped".to_string(),
    }
}

async fn run<S>(
    store: Arc<S>,
    scope: UserScope,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<ReorderCommand>,
) where
    S: StepStore + ?Sized,
{
    let mut pending: Option<Vec<OrderUpdate>> = None;

    loop {
        let wake = if pending.is_some() {
            tokio::select! {
                command = rx.recv() => Wake::Command(command),
                () = time::sleep(delay) => Wake::Elapsed,
            }
        } else {
            Wake::Command(rx.recv().await)
        };

        match wake {
            Wake::Elapsed => {
                if let Some(orders) = pending.take() {
                    write_logged(store.as_ref(), &scope, &orders).await;
                }
            }
            Wake::Command(Some(ReorderCommand::Schedule(orders))) => {
                if pending.replace(orders).is_some() {
                    debug!("Replaced pending reorder batch");
                }
            }
            Wake::Command(Some(ReorderCommand::Flush(reply))) => {
                let result = match pending.take() {
                    Some(orders) => store.update_orders(&scope, &orders).await,
                    None => Ok(()),
                };
                let _ = reply.send(result);
            }
            Wake::Command(None) => {
                if let Some(orders) = pending.take() {
                    debug!("Writing pending reorder on teardown");
                    write_logged(store.as_ref(), &scope, &orders).await;
                }
                break;
            }
        }
    }
}

async fn write_logged<S>(store: &S, scope: &UserScope, orders: &[OrderUpdate])
where
    S: StepStore + ?Sized,
{
    if let Err(e) = store.update_orders(scope, orders).await {
        warn!("Failed to save step order: {e}");
    }
}
