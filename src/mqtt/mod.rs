pub mod client;

use crate::nuki::OutboundMessage;

/// Work handed from the lock to the MQTT task.
#[derive(Debug)]
pub enum Request {
    Publish(OutboundMessage),
    /// Replace the current subscription with this filter.
    Subscribe(String),
}
