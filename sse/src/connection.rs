use axum::response::sse::Event;
use dashmap::DashMap;
use log::*;
use std::collections::HashSet;
use std::convert::Infallible;
use tokio::sync::mpsc::UnboundedSender;

pub type Topic = String;

pub type EventSender = UnboundedSender<Result<Event, Infallible>>;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub topics: HashSet<Topic>,
    pub sender: EventSender,
}

/// Connection registry with a topic index for routing published messages.
pub struct ConnectionRegistry {
    /// Primary storage: lookup by connection_id for registration/cleanup
    connections: DashMap<ConnectionId, ConnectionInfo>,

    /// Secondary index: the connections subscribed to each topic
    topic_index: DashMap<Topic, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            topic_index: DashMap::new(),
        }
    }

    /// Register a connection under every topic in `topics`. Repeated topics are indexed once.
    pub fn register(
        &self,
        topics: impl IntoIterator<Item = Topic>,
        sender: EventSender,
    ) -> ConnectionId {
        let connection_id = ConnectionId::new();
        let topics: HashSet<Topic> = topics.into_iter().collect();

        for topic in &topics {
            self.topic_index
                .entry(topic.clone())
                .or_default()
                .insert(connection_id.clone());
        }

        self.connections
            .insert(connection_id.clone(), ConnectionInfo { topics, sender });

        connection_id
    }

    /// Unregister a connection from primary storage and every topic it was indexed under.
    /// Unknown ids are ignored, so this is safe to call more than once.
    pub fn unregister(&self, connection_id: &ConnectionId) {
        if let Some((_, info)) = self.connections.remove(connection_id) {
            for topic in info.topics {
                if let Some(mut entry) = self.topic_index.get_mut(&topic) {
                    entry.remove(connection_id);

                    // Clean up empty topic entries
                    if entry.is_empty() {
                        drop(entry); // Release lock before removal
                        self.topic_index.remove_if(&topic, |_, ids| ids.is_empty());
                    }
                }
            }
        }
    }

    /// Send `event` to every connection subscribed to `topic` and return how many accepted it.
    ///
    /// Connections whose receiving side has gone away are unregistered.
    pub fn send_to_topic(&self, topic: &str, event: Event) -> usize {
        // Snapshot the subscribers so no index lock is held while sending or cleaning up.
        let connection_ids: Vec<ConnectionId> = match self.topic_index.get(topic) {
            Some(ids) => ids.iter().cloned().collect(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut closed = Vec::new();

        for conn_id in connection_ids {
            let Some(info) = self.connections.get(&conn_id) else {
                continue;
            };

            match info.sender.send(Ok(event.clone())) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        "Failed to send event to connection {}: {}. Connection will be cleaned up.",
                        conn_id.as_str(),
                        e
                    );
                    closed.push(conn_id.clone());
                }
            }
        }

        for conn_id in &closed {
            self.unregister(conn_id);
        }

        delivered
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topic_index.get(topic).map_or(0, |ids| ids.len())
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
