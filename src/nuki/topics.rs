//! Topic namespace of one lock: `{base_topic}/{device_id}/{suffix}`.

use crate::error::{Error, Result};

pub const DEFAULT_BASE_TOPIC: &str = "nuki";
pub const DEFAULT_DEVICE_ID: &str = "45A2F2BF";

/// Suffix of the command topic.
pub const COMMAND_SUFFIX: &str = "lockAction";

/// Which lock this bridge talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub base_topic: String,
    pub device_id: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            base_topic: DEFAULT_BASE_TOPIC.to_string(),
            device_id: DEFAULT_DEVICE_ID.to_string(),
        }
    }
}

impl DeviceIdentity {
    pub fn new(base_topic: impl Into<String>, device_id: impl Into<String>) -> Result<Self> {
        let identity = Self {
            base_topic: base_topic.into(),
            device_id: device_id.into(),
        };
        identity.validate()?;
        Ok(identity)
    }

    /// Both parts end up as single topic levels, so they must be non-empty and
    /// free of separators and wildcards.
    pub fn validate(&self) -> Result<()> {
        check_segment("base_topic", &self.base_topic)?;
        check_segment("device_id", &self.device_id)
    }
}

fn check_segment(name: &'static str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains(['/', '+', '#']) {
        return Err(Error::InvalidTopicSegment {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// All topic strings derived from a [`DeviceIdentity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTopics {
    root: String,
}

impl DeviceTopics {
    pub fn new(identity: &DeviceIdentity) -> Self {
        Self {
            root: format!("{}/{}/", identity.base_topic, identity.device_id),
        }
    }

    /// `{base_topic}/{device_id}/`, including the trailing separator.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn topic(&self, suffix: &str) -> String {
        format!("{}{}", self.root, suffix)
    }

    pub fn command(&self) -> String {
        self.topic(COMMAND_SUFFIX)
    }

    /// Subscription filter covering every topic of this lock.
    pub fn subscription(&self) -> String {
        format!("{}#", self.root)
    }

    /// Return the last topic level if `topic` sits directly under the root.
    pub fn suffix<'a>(&self, topic: &'a str) -> Option<&'a str> {
        let suffix = topic.strip_prefix(self.root.as_str())?;
        if suffix.is_empty() || suffix.contains('/') {
            return None;
        }
        Some(suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_generation() {
        let topics = DeviceTopics::new(&DeviceIdentity::new("home", "ABC123").unwrap());

        assert_eq!(topics.root(), "home/ABC123/");
        assert_eq!(topics.topic("lockState"), "home/ABC123/lockState");
        assert_eq!(topics.command(), "home/ABC123/lockAction");
        assert_eq!(topics.subscription(), "home/ABC123/#");
    }

    #[test]
    fn suffix_requires_exact_root() {
        let topics = DeviceTopics::new(&DeviceIdentity::default());

        assert_eq!(topics.suffix("nuki/45A2F2BF/lockState"), Some("lockState"));
        assert_eq!(topics.suffix("nuki/OTHER/lockState"), None);
        assert_eq!(topics.suffix("x/nuki/45A2F2BF/lockState"), None);
        assert_eq!(topics.suffix("nuki/45A2F2BF/"), None);
        assert_eq!(topics.suffix("nuki/45A2F2BF/a/lockState"), None);
        assert_eq!(topics.suffix("nuki/45A2F2BF0/lockState"), None);
    }

    #[test]
    fn rejects_bad_segments() {
        assert!(DeviceIdentity::new("", "abc").is_err());
        assert!(DeviceIdentity::new("nuki", "").is_err());
        assert!(DeviceIdentity::new("nuki/x", "abc").is_err());
        assert!(DeviceIdentity::new("nuki", "+").is_err());
        assert!(matches!(
            DeviceIdentity::new("nuki", "a#"),
            Err(Error::InvalidTopicSegment { name: "device_id", .. })
        ));
    }
}
