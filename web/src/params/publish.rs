use serde::de::{Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use sse::Message;
use std::fmt;
use utoipa::ToSchema;

/// The JSON body a producer posts to the publish endpoint.
///
/// Field names match without regard to ASCII case, so `Data` and `EVENT` are accepted.
/// Both fields default to the empty string when absent or `null` and unknown fields are
/// ignored. When a name appears more than once the last value wins.
///
/// # Fields
///
/// * `data` - The payload delivered to consumers as the frame's `data:` lines
/// * `event` - The event name, which is also the topic the message is routed to
#[derive(Debug, Default, ToSchema)]
pub(crate) struct PublishParams {
    #[schema(example = "Test message")]
    pub(crate) data: String,
    #[schema(example = "test")]
    pub(crate) event: String,
}

impl PublishParams {
    /// Decodes the first JSON value in `body`. Anything after it is ignored, and a
    /// top-level `null` yields empty params.
    pub(crate) fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::Deserializer::from_slice(body)
            .into_iter::<Option<PublishParams>>()
            .next()
        {
            Some(params) => Ok(params?.unwrap_or_default()),
            // Nothing but whitespace: let the decoder report the EOF.
            None => serde_json::from_slice(body),
        }
    }
}

impl<'de> Deserialize<'de> for PublishParams {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PublishParamsVisitor)
    }
}

struct PublishParamsVisitor;

impl<'de> Visitor<'de> for PublishParamsVisitor {
    type Value = PublishParams;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object with string fields `data` and `event`")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut params = PublishParams::default();

        while let Some(key) = map.next_key::<String>()? {
            let field = if key.eq_ignore_ascii_case("data") {
                &mut params.data
            } else if key.eq_ignore_ascii_case("event") {
                &mut params.event
            } else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };

            // null leaves the field as it was
            if let Some(value) = map.next_value::<Option<String>>()? {
                *field = value;
            }
        }

        Ok(params)
    }
}

impl From<PublishParams> for Message {
    fn from(params: PublishParams) -> Self {
        Message::new(params.data, params.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> Result<Message, serde_json::Error> {
        PublishParams::from_body(body.as_bytes()).map(Message::from)
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let message = decode(r#"{"data":"hello","event":"news","extra":{"a":[1]}}"#).unwrap();
        assert_eq!(message, Message::new("hello", "news"));
    }

    #[test]
    fn test_missing_or_null_fields_default_to_empty() {
        assert_eq!(decode("{}").unwrap(), Message::default());
        assert_eq!(
            decode(r#"{"data":null,"event":"x"}"#).unwrap(),
            Message::new("", "x")
        );
        assert_eq!(decode("null").unwrap(), Message::default());
    }

    #[test]
    fn test_field_names_match_regardless_of_case() {
        let message = decode(r#"{"Data":"x","EVENT":"test"}"#).unwrap();
        assert_eq!(message, Message::new("x", "test"));
    }

    #[test]
    fn test_last_occurrence_of_a_field_wins() {
        let message = decode(r#"{"event":"first","Event":"second"}"#).unwrap();
        assert_eq!(message.event, "second");
    }

    #[test]
    fn test_content_after_the_first_value_is_ignored() {
        let message = decode(r#"{"data":"x","event":"t"}{"junk":1}"#).unwrap();
        assert_eq!(message, Message::new("x", "t"));

        let message = decode("{\"data\":\"y\"}\n garbage").unwrap();
        assert_eq!(message, Message::new("y", ""));
    }

    #[test]
    fn test_non_string_fields_are_rejected() {
        assert!(decode(r#"{"data":1}"#).is_err());
        assert!(decode(r#"{"Event":["a"]}"#).is_err());
    }

    #[test]
    fn test_empty_or_non_object_bodies_are_rejected() {
        assert!(decode("").is_err());
        assert!(decode("   ").is_err());
        assert!(decode("[]").is_err());
        assert!(decode(r#""text""#).is_err());
        assert!(decode("{not json").is_err());
    }
}
