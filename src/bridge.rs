use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::control::ControlCommand;
use crate::error::Result;
use crate::mqtt::Request;
use crate::nuki::{DeviceIdentity, Field, FieldUpdate, Host, NukiLock, OutboundMessage};

/// [`Host`] backed by the MQTT task. Requests are queued without waiting.
pub struct MqttHost {
    requests: mpsc::Sender<Request>,
}

impl MqttHost {
    pub fn new(requests: mpsc::Sender<Request>) -> Self {
        Self { requests }
    }

    fn send(&self, request: Request) {
        if let Err(e) = self.requests.try_send(request) {
            warn!("Dropping MQTT request: {}", e);
        }
    }
}

impl Host for MqttHost {
    fn publish(&mut self, message: OutboundMessage) {
        self.send(Request::Publish(message));
    }

    fn set_subscription(&mut self, filter: &str) {
        self.send(Request::Subscribe(filter.to_string()));
    }

    fn field_changed(&mut self, update: &FieldUpdate) {
        info!("{} = {}", update.field().display_name(), update);
    }
}

/// Apply one control command to the lock.
pub fn execute<H: Host>(lock: &mut NukiLock<H>, command: ControlCommand) -> Result<()> {
    match command {
        ControlCommand::Lock => lock.lock(),
        ControlCommand::Unlock => lock.unlock(),
        ControlCommand::Unlatch => lock.unlatch(),
        ControlCommand::Set { field, value } => {
            lock.request_action(&field, &value)?;
        }
        ControlCommand::Configure {
            base_topic,
            device_id,
        } => lock.reconfigure(DeviceIdentity::new(base_topic, device_id)?)?,
        ControlCommand::Inject(json) => lock.receive_json(&json),
        ControlCommand::Status => {
            for field in Field::ALL {
                match lock.status().get(field) {
                    Some(value) => info!("{:<20} {}", field.display_name(), value),
                    None => info!("{:<20} -", field.display_name()),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::nuki::LockAction;

    fn lock() -> (NukiLock<MqttHost>, mpsc::Receiver<Request>) {
        let (tx, rx) = mpsc::channel(8);
        let lock = NukiLock::new(DeviceIdentity::default(), MqttHost::new(tx)).unwrap();
        (lock, rx)
    }

    #[test]
    fn subscription_is_queued_on_creation() {
        let (_lock, mut rx) = lock();
        assert!(matches!(
            rx.try_recv(),
            Ok(Request::Subscribe(filter)) if filter == "nuki/45A2F2BF/#"
        ));
    }

    #[test]
    fn lock_command_queues_publish() {
        let (mut lock, mut rx) = lock();
        let _ = rx.try_recv();

        execute(&mut lock, ControlCommand::Lock).unwrap();

        match rx.try_recv() {
            Ok(Request::Publish(message)) => {
                assert_eq!(message, OutboundMessage::new("nuki/45A2F2BF/lockAction", "2"));
            }
            other => panic!("unexpected request: {other:?}"),
        }
        assert_eq!(lock.status().lock_action(), Some(LockAction::Lock));
    }

    #[test]
    fn set_with_unknown_field_fails() {
        let (mut lock, mut rx) = lock();
        let _ = rx.try_recv();

        let result = execute(
            &mut lock,
            ControlCommand::Set {
                field: "Firmware".into(),
                value: "1".into(),
            },
        );
        assert!(matches!(result, Err(Error::UnsupportedField(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn configure_resubscribes() {
        let (mut lock, mut rx) = lock();
        let _ = rx.try_recv();

        execute(
            &mut lock,
            ControlCommand::Configure {
                base_topic: "home".into(),
                device_id: "B2".into(),
            },
        )
        .unwrap();

        assert!(matches!(
            rx.try_recv(),
            Ok(Request::Subscribe(filter)) if filter == "home/B2/#"
        ));
    }

    #[test]
    fn inject_updates_status() {
        let (mut lock, _rx) = lock();
        execute(
            &mut lock,
            ControlCommand::Inject(
                r#"{"Topic":"nuki/45A2F2BF/doorsensorState","Payload":"2"}"#.into(),
            ),
        )
        .unwrap();

        assert_eq!(lock.status().door_sensor_state_code(), Some(2));
    }

    #[test]
    fn full_queue_drops_requests() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut lock = NukiLock::new(DeviceIdentity::default(), MqttHost::new(tx)).unwrap();

        lock.unlock();
        assert!(matches!(rx.try_recv(), Ok(Request::Subscribe(_))));
        assert!(rx.try_recv().is_err());
        assert_eq!(lock.status().lock_action(), Some(LockAction::Unlock));
    }
}
