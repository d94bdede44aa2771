use serde::Deserialize;

/// An inbound message as delivered by the transport. Either part may be
/// missing when the host forwards packets it did not build itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub topic: Option<String>,
    pub payload: Option<Vec<u8>>,
}

// Host data packet: {"Topic": "...", "Payload": "...", ...}
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "Topic", alias = "topic", default)]
    topic: Option<String>,
    #[serde(rename = "Payload", alias = "payload", default)]
    payload: Option<String>,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: Some(topic.into()),
            payload: Some(payload.into()),
        }
    }

    /// Parse a JSON data packet. Other keys in the object are ignored.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawEnvelope = serde_json::from_str(json)?;
        Ok(Self {
            topic: raw.topic,
            payload: raw.payload.map(String::into_bytes),
        })
    }

    /// Topic and payload, or `None` if either is missing.
    pub fn into_parts(self) -> Option<(String, Vec<u8>)> {
        Some((self.topic?, self.payload?))
    }
}
