use crate::message::{EventId, Message, PublishedMessage};
use std::collections::{HashSet, VecDeque};

/// Assigns event ids and keeps the most recent messages for `Last-Event-ID` resumption.
///
/// Ids start at 1 and increase by one per published message. With a capacity of zero no
/// message is retained and nothing is ever replayed.
#[derive(Debug)]
pub struct Journal {
    next_id: EventId,
    capacity: usize,
    entries: VecDeque<PublishedMessage>,
}

impl Journal {
    pub fn new(capacity: usize) -> Self {
        Self {
            next_id: 1,
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Assigns the next id to `message`, retaining it if replay is enabled.
    pub fn record(&mut self, message: Message) -> PublishedMessage {
        let published = PublishedMessage {
            id: self.next_id,
            message,
        };
        self.next_id += 1;

        if self.capacity > 0 {
            if self.entries.len() == self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back(published.clone());
        }

        published
    }

    /// Retained messages published after `last_event_id` whose topic is in `topics`, oldest first.
    ///
    /// An id that does not parse as a number replays nothing.
    pub fn since(&self, last_event_id: &str, topics: &HashSet<String>) -> Vec<PublishedMessage> {
        let Ok(last_seen) = last_event_id.trim().parse::<EventId>() else {
            return Vec::new();
        };

        self.entries
            .iter()
            .filter(|published| published.id > last_seen)
            .filter(|published| topics.contains(published.message.topic()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
