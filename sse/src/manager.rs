use crate::connection::{ConnectionId, ConnectionRegistry, EventSender, Topic};
use crate::message::{EventId, InvalidEventName, Message, PublishedMessage};
use crate::replay::Journal;
use log::*;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

pub struct Manager {
    registry: ConnectionRegistry,
    /// Serializes publishes against each other and against new subscriptions, so every
    /// connection sees messages in id order and a resuming client neither misses nor
    /// duplicates a message published while it subscribes.
    journal: Mutex<Journal>,
}

impl Manager {
    /// Creates a manager retaining up to `replay_capacity` messages for resumption.
    pub fn new(replay_capacity: usize) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            journal: Mutex::new(Journal::new(replay_capacity)),
        }
    }

    /// Register a connection for `topics`, first replaying retained messages published
    /// after `last_event_id`. The returned guard unregisters the connection when dropped.
    pub fn subscribe(
        self: &Arc<Self>,
        topics: Vec<Topic>,
        last_event_id: &str,
        sender: EventSender,
    ) -> ConnectionGuard {
        let journal = self.journal.lock();

        let topic_set: HashSet<Topic> = topics.iter().cloned().collect();
        let replay = journal.since(last_event_id, &topic_set);
        if !replay.is_empty() {
            debug!(
                "Replaying {} message(s) after event id {last_event_id}",
                replay.len()
            );
        }
        for published in &replay {
            // The receiver is held by the caller, so this only fails if it was already dropped.
            let _ = sender.send(Ok(published.to_event()));
        }

        let connection_id = self.registry.register(topics, sender);
        drop(journal);

        debug!("Registered new SSE connection {}", connection_id.as_str());

        ConnectionGuard {
            manager: Arc::clone(self),
            connection_id,
        }
    }

    /// Unregister a connection by ID
    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        debug!("Unregistering SSE connection {}", connection_id.as_str());
        self.registry.unregister(connection_id);
    }

    /// Publish `message` to every connection subscribed to its topic and return its id.
    ///
    /// Delivery is fire-and-forget: the message is queued on each subscriber's stream and
    /// this returns without waiting for it to be written.
    pub fn publish(&self, message: Message) -> Result<EventId, InvalidEventName> {
        message.validate()?;

        let mut journal = self.journal.lock();
        let published: PublishedMessage = journal.record(message);
        let topic = published.message.topic();
        let delivered = self.registry.send_to_topic(topic, published.to_event());
        drop(journal);

        debug!(
            "Published event {} on topic {:?} to {} connection(s)",
            published.id, topic, delivered
        );

        Ok(published.id)
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.subscriber_count(topic)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Keeps a stream connection registered for as long as it is alive.
///
/// Held by the response stream; when the client disconnects or the server shuts down the
/// stream is dropped and the connection is removed from every topic.
pub struct ConnectionGuard {
    manager: Arc<Manager>,
    connection_id: ConnectionId,
}

impl ConnectionGuard {
    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.manager.unregister_connection(&self.connection_id);
    }
}
