//! Per-connection outboxes and the lobby broadcast primitive
//!
//! Every WebSocket registers an unbounded outbox here. Game state never holds
//! sockets; it addresses connections by id and this registry delivers.

use crate::protocol::ServerMessage;
use crate::types::ConnectionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

pub type Outbox = mpsc::UnboundedReceiver<ServerMessage>;

#[derive(Clone, Default)]
pub struct Connections {
    senders: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>>>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return the receiving end of its outbox
    pub async fn register(&self, connection_id: &str) -> Outbox {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders
            .write()
            .await
            .insert(connection_id.to_string(), tx);
        rx
    }

    pub async fn unregister(&self, connection_id: &str) {
        self.senders.write().await.remove(connection_id);
    }

    pub async fn count(&self) -> usize {
        self.senders.read().await.len()
    }

    /// Send to a single connection. Dropped silently if it is gone.
    pub async fn send_to(&self, connection_id: &str, msg: ServerMessage) {
        if let Some(tx) = self.senders.read().await.get(connection_id) {
            if tx.send(msg).is_err() {
                tracing::debug!("Outbox for {} closed, dropping message", connection_id);
            }
        }
    }

    /// Send the same message to every listed connection
    pub async fn broadcast(&self, recipients: &[ConnectionId], msg: ServerMessage) {
        let senders = self.senders.read().await;
        for id in recipients {
            if let Some(tx) = senders.get(id) {
                // Ignore send errors (socket may be closing)
                let _ = tx.send(msg.clone());
            }
        }
    }
}
