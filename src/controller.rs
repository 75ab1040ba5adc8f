//! Long running controllers started once deployment is done.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ControllerErrors;

/// A long running process, started after every resource has been submitted.
///
/// Implementations are expected to return soon after `stop` is cancelled.
/// Nothing forces them to, and nobody waits for them once it is.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn run(&self, stop: CancellationToken) -> anyhow::Result<()>;
}

/// Controllers by name. Registering a name twice keeps the latest handle.
#[derive(Default, Clone)]
pub struct ControllerSet {
    controllers: BTreeMap<String, Arc<dyn Controller>>,
}

impl ControllerSet {
    pub fn insert(&mut self, name: impl Into<String>, controller: Arc<dyn Controller>) {
        self.controllers.insert(name.into(), controller);
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.controllers.keys().map(String::as_str)
    }

    /// Spawn every controller and collect their errors until `stop` is cancelled.
    ///
    /// Returns at once, with an empty report, when there are no controllers.
    /// Errors land in the report in the order they arrive. A controller that
    /// fails after the stop signal is observed is not reported.
    pub async fn run(&self, stop: CancellationToken) -> ControllerErrors {
        let mut errors = ControllerErrors::default();
        if self.controllers.is_empty() {
            return errors;
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<(String, anyhow::Error)>();
        for (name, controller) in &self.controllers {
            let name = name.clone();
            let controller = Arc::clone(controller);
            let tx = tx.clone();
            let stop = stop.clone();
            tokio::spawn(async move {
                debug!(controller = %name, "controller starting");
                match controller.run(stop).await {
                    Ok(()) => debug!(controller = %name, "controller exited"),
                    Err(e) => {
                        // receiver is gone once the stop signal fired
                        let _ = tx.send((name, e));
                    }
                }
            });
        }
        drop(tx);
        debug!(count = self.controllers.len(), "controllers running");

        loop {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Some((name, e)) => {
                        warn!(controller = %name, error = %e, "controller failed");
                        errors.push(name, e);
                    }
                    // every controller has finished, only the stop signal is left
                    None => {
                        stop.cancelled().await;
                        break;
                    }
                },
                _ = stop.cancelled() => break,
            }
        }
        debug!("controllers stopped");
        errors
    }
}
