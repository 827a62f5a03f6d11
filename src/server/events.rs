//! Event channel for the dashboard. The wire protocol is intentionally
//! undefined in this scope: connections register and receive keep-alives,
//! and `broadcast` exists as the integration point for whenever a payload
//! protocol is decided. Connections are tracked per-id in a registry, never
//! in a single overwritten slot.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::server::api::AppState;

/// connection-id -> sender handle for every open event stream.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    senders: Mutex<HashMap<Uuid, mpsc::UnboundedSender<String>>>,
}

impl ConnectionRegistry {
    pub fn new() -> ConnectionRegistry {
        ConnectionRegistry::default()
    }

    /// Register a new connection; the receiver half feeds its SSE stream.
    pub fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.lock().insert(id, sender);
        (id, receiver)
    }

    pub fn unregister(&self, id: Uuid) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Open connections. Streams dropped by disconnected clients are pruned
    /// here and on broadcast rather than eagerly.
    pub fn connection_count(&self) -> usize {
        let mut senders = self.lock();
        senders.retain(|_, sender| !sender.is_closed());
        senders.len()
    }

    /// Send a payload to every open connection; returns how many received it.
    pub fn broadcast(&self, payload: &str) -> usize {
        let mut senders = self.lock();
        senders.retain(|_, sender| sender.send(payload.to_string()).is_ok());
        senders.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::UnboundedSender<String>>> {
        match self.senders.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// GET /api/events: register the connection and stream whatever is broadcast.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (id, receiver) = state.events.register();
    println!(
        "event stream connected: {id} ({} active)",
        state.events.connection_count()
    );
    let stream =
        UnboundedReceiverStream::new(receiver).map(|payload| Ok(Event::default().data(payload)));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::ConnectionRegistry;

    #[test]
    fn register_tracks_each_connection_by_id() {
        let registry = ConnectionRegistry::new();
        let (first, _rx_first) = registry.register();
        let (second, _rx_second) = registry.register();
        assert_ne!(first, second);
        assert_eq!(registry.connection_count(), 2);
    }

    #[test]
    fn unregister_removes_only_the_given_connection() {
        let registry = ConnectionRegistry::new();
        let (first, _rx_first) = registry.register();
        let (_second, _rx_second) = registry.register();
        assert!(registry.unregister(first));
        assert!(!registry.unregister(first));
        assert_eq!(registry.connection_count(), 1);
    }

    #[test]
    fn broadcast_delivers_to_every_open_connection() {
        let registry = ConnectionRegistry::new();
        let (_first, mut rx_first) = registry.register();
        let (_second, mut rx_second) = registry.register();

        assert_eq!(registry.broadcast("ping"), 2);
        assert_eq!(rx_first.try_recv().as_deref(), Ok("ping"));
        assert_eq!(rx_second.try_recv().as_deref(), Ok("ping"));
    }

    #[test]
    fn dropped_receivers_are_pruned_on_broadcast() {
        let registry = ConnectionRegistry::new();
        let (_first, rx_first) = registry.register();
        let (_second, _rx_second) = registry.register();
        drop(rx_first);

        assert_eq!(registry.broadcast("ping"), 1);
        assert_eq!(registry.connection_count(), 1);
    }
}
