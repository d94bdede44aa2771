use std::env;

use crate::error::{Error, Result};
use crate::nuki::DeviceIdentity;
use crate::nuki::topics::{DEFAULT_BASE_TOPIC, DEFAULT_DEVICE_ID};

#[derive(Debug, Clone)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub lock: DeviceIdentity,
}

#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
}

/// Reads settings by key. `std::env::var` in production, a map in tests.
struct Settings<F>(F);

impl<F: Fn(&str) -> Option<String>> Settings<F> {
    fn required(&self, key: &str) -> Result<String> {
        (self.0)(key)
            .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    fn or_default<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        (self.0)(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings = Settings(lookup);

        let config = Self {
            mqtt: MqttConfig {
                broker_host: settings.required("MQTT_BROKER_HOST")?,
                broker_port: settings.or_default("MQTT_BROKER_PORT", 1883),
                username: settings.optional("MQTT_USERNAME"),
                password: settings.optional("MQTT_PASSWORD"),
                client_id: settings.or_default("MQTT_CLIENT_ID", "nuki-mqtt-bridge".to_string()),
            },
            lock: DeviceIdentity {
                base_topic: settings.or_default("NUKI_BASE_TOPIC", DEFAULT_BASE_TOPIC.to_string()),
                device_id: settings.or_default("NUKI_DEVICE_ID", DEFAULT_DEVICE_ID.to_string()),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.mqtt.broker_host.is_empty() {
            return Err(Error::Config("MQTT_BROKER_HOST must not be empty".into()));
        }
        if self.mqtt.client_id.is_empty() {
            return Err(Error::Config("MQTT_CLIENT_ID must not be empty".into()));
        }
        self.lock.validate()
    }
}
