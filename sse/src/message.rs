use axum::response::sse::Event;
use std::fmt;

/// The reserved topic every stream connection is subscribed to.
///
/// A message whose `event` is empty has no explicit topic and is routed here, so it
/// reaches every connected consumer.
pub const DEFAULT_TOPIC: &str = "";

/// Identifier assigned to each published message, sent as the frame's `id:` field.
pub type EventId = u64;

/// The envelope producers publish: a payload and the event name that doubles as its topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub data: String,
    pub event: String,
}

impl Message {
    pub fn new(data: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            event: event.into(),
        }
    }

    /// The topic this message is routed to.
    pub fn topic(&self) -> &str {
        if self.event.is_empty() {
            DEFAULT_TOPIC
        } else {
            &self.event
        }
    }

    /// Event names are written verbatim into an `event:` line, so line breaks can't be framed.
    pub fn validate(&self) -> Result<(), InvalidEventName> {
        if self.event.contains(['\r', '\n']) {
            Err(InvalidEventName)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidEventName;

impl fmt::Display for InvalidEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event name must not contain line breaks")
    }
}

impl std::error::Error for InvalidEventName {}

/// A message after publication, carrying the id it was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub id: EventId,
    pub message: Message,
}

impl PublishedMessage {
    /// Builds the stream frame for this message.
    ///
    /// CRLF and lone CR in the payload are normalized to LF so each payload line becomes
    /// its own `data:` line.
    pub fn to_event(&self) -> Event {
        let data = self.message.data.replace("\r\n", "\n").replace('\r', "\n");
        let event = Event::default().id(self.id.to_string()).data(data);

        if self.message.event.is_empty() {
            event
        } else {
            event.event(&self.message.event)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_event_routes_to_default_topic() {
        assert_eq!(Message::new("x", "").topic(), DEFAULT_TOPIC);
        assert_eq!(Message::new("x", "alerts").topic(), "alerts");
    }

    #[test]
    fn test_validate_rejects_line_breaks_in_event_name() {
        assert_eq!(Message::new("x", "a\nb").validate(), Err(InvalidEventName));
        assert_eq!(Message::new("x", "a\rb").validate(), Err(InvalidEventName));
        assert!(Message::new("multi\nline\rdata", "ok").validate().is_ok());
    }

    #[test]
    fn test_to_event_tolerates_carriage_returns_in_data() {
        let published = PublishedMessage {
            id: 1,
            message: Message::new("one\r\ntwo\rthree", "news"),
        };
        // Building the frame must not panic.
        let _event = published.to_event();
    }
}
