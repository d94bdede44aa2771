//! Bridge between a Nuki smart lock's MQTT topics and a host automation
//! platform.
//!
//! [`nuki::NukiLock`] routes status topics onto typed fields and turns
//! lock/unlock/unlatch requests into `lockAction` publishes. The platform is
//! reached through the [`nuki::Host`] trait; [`bridge::MqttHost`] implements
//! it on top of a rumqttc connection.

pub mod bridge;
pub mod config;
pub mod control;
pub mod error;
pub mod mqtt;
pub mod nuki;

pub use error::{Error, Result};
