//! Stop signal shared by the HTTP listener, the move scheduler and the
//! signal handler.
//!
//! Subscribers must exist before [`Shutdown::trigger`]; the server and the
//! scheduler subscribe when `HttpServer::run` starts.

use tokio::sync::broadcast;

/// Cloneable stop handle. Every clone triggers and subscribes to the same signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver that resolves once the gateway is asked to stop.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask the listener and scheduler to stop. Returns how many tasks were told.
    pub fn trigger(&self) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::debug!(notified, "Shutdown triggered");
        notified
    }

    /// Tasks still listening for the stop signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
