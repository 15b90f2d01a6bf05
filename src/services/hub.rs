use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Frame kinds pushed to connected clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HubEvent {
    ReceiveNotification,
    ReceiveMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct HubFrame {
    #[serde(rename = "type")]
    pub event: HubEvent,
    pub payload: Value,
}

pub type HubSender = mpsc::UnboundedSender<HubFrame>;
pub type HubReceiver = mpsc::UnboundedReceiver<HubFrame>;

/// In-process push hub: user id to the live connections of that user.
#[derive(Clone, Default)]
pub struct NotificationHub {
    connections: Arc<RwLock<HashMap<Uuid, HashMap<usize, HubSender>>>>,
    next_id: Arc<AtomicUsize>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection; the returned id is used to unregister it
    pub async fn register(&self, user_id: Uuid) -> (usize, HubReceiver) {
        let conn_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(conn_id, tx);
        tracing::debug!("Hub connection {} registered for user {}", conn_id, user_id);
        (conn_id, rx)
    }

    pub async fn unregister(&self, user_id: Uuid, conn_id: usize) {
        let mut connections = self.connections.write().await;
        if let Some(user_conns) = connections.get_mut(&user_id) {
            user_conns.remove(&conn_id);
            if user_conns.is_empty() {
                connections.remove(&user_id);
            }
        }
        tracing::debug!("Hub connection {} removed for user {}", conn_id, user_id);
    }

    /// Push to every connection of the user. Returns how many received it.
    pub async fn send_to_user(&self, user_id: Uuid, event: HubEvent, payload: impl Serialize) -> usize {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize hub payload: {}", e);
                return 0;
            }
        };
        let frame = HubFrame { event, payload };

        let connections = self.connections.read().await;
        let Some(user_conns) = connections.get(&user_id) else {
            return 0;
        };
        user_conns
            .values()
            .filter(|tx| tx.send(frame.clone()).is_ok())
            .count()
    }

    pub async fn connection_count(&self, user_id: Uuid) -> usize {
        self.connections
            .read()
            .await
            .get(&user_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn frames_reach_every_tab_of_the_user() {
        let hub = NotificationHub::new();
        let user = Uuid::new_v4();
        let (_, mut first) = hub.register(user).await;
        let (_, mut second) = hub.register(user).await;

        let delivered = hub
            .send_to_user(user, HubEvent::ReceiveMessage, json!({"content": "hello"}))
            .await;
        assert_eq!(delivered, 2);

        let frame = first.recv().await.unwrap();
        assert_eq!(frame.event, HubEvent::ReceiveMessage);
        assert_eq!(frame.payload["content"], "hello");
        assert!(second.recv().await.is_some());
    }

    #[tokio::test]
    async fn sends_to_offline_users_are_dropped() {
        let hub = NotificationHub::new();
        let delivered = hub
            .send_to_user(Uuid::new_v4(), HubEvent::ReceiveNotification, json!({}))
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn unregister_removes_only_that_connection() {
        let hub = NotificationHub::new();
        let user = Uuid::new_v4();
        let (a, _rx_a) = hub.register(user).await;
        let (b, _rx_b) = hub.register(user).await;
        assert_ne!(a, b);

        hub.unregister(user, a).await;
        assert_eq!(hub.connection_count(user).await, 1);
        hub.unregister(user, b).await;
        assert_eq!(hub.connection_count(user).await, 0);
    }

    #[test]
    fn frame_serializes_with_type_tag() {
        let frame = HubFrame {
            event: HubEvent::ReceiveNotification,
            payload: json!({"id": 1}),
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "ReceiveNotification");
        assert_eq!(value["payload"]["id"], 1);
    }
}
