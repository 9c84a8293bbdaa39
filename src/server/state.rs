//! Shared server state.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::agents::LoopEvent;
use crate::config::AppConfig;

/// Capacity of the progress broadcast channel; slow SSE subscribers lag
/// rather than blocking the loop.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    event_tx: broadcast::Sender<LoopEvent>,
}

impl AppState {
    /// Creates server state around the process configuration.
    pub fn new(config: AppConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config: Arc::new(config),
            event_tx,
        }
    }

    /// Returns the process configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the progress broadcast sender.
    pub fn events(&self) -> &broadcast::Sender<LoopEvent> {
        &self.event_tx
    }

    /// Subscribes to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.event_tx.subscribe()
    }
}
