use tracing::{debug, info};

use crate::error::{Error, Result};

use super::envelope::Envelope;
use super::field::{Field, FieldUpdate, LockStatus};
use super::router::{Router, parse_int};
use super::topics::{DeviceIdentity, DeviceTopics};
use super::{LockAction, OutboundMessage};

/// The platform side of the bridge.
pub trait Host {
    /// Hand a message to the transport. Must not block or wait for delivery.
    fn publish(&mut self, message: OutboundMessage);

    /// Replace the active subscription filter.
    fn set_subscription(&mut self, filter: &str);

    /// Called after a field took a new value.
    fn field_changed(&mut self, _update: &FieldUpdate) {}
}

/// One configured lock: its topics, its field values and the host it reports to.
pub struct NukiLock<H> {
    identity: DeviceIdentity,
    router: Router,
    status: LockStatus,
    host: H,
}

impl<H: Host> NukiLock<H> {
    /// Validates `identity` and installs the subscription filter on `host`.
    pub fn new(identity: DeviceIdentity, mut host: H) -> Result<Self> {
        identity.validate()?;
        let topics = DeviceTopics::new(&identity);
        host.set_subscription(&topics.subscription());

        Ok(Self {
            identity,
            router: Router::new(topics),
            status: LockStatus::default(),
            host,
        })
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn topics(&self) -> &DeviceTopics {
        self.router.topics()
    }

    pub fn status(&self) -> &LockStatus {
        &self.status
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Point the bridge at another lock. All topics and the subscription
    /// filter are derived again; field values are kept.
    pub fn reconfigure(&mut self, identity: DeviceIdentity) -> Result<()> {
        identity.validate()?;
        if identity == self.identity {
            return Ok(());
        }

        let topics = DeviceTopics::new(&identity);
        info!("Reconfigured lock topics: {}", topics.subscription());
        self.host.set_subscription(&topics.subscription());
        self.router = Router::new(topics);
        self.identity = identity;
        Ok(())
    }

    /// Handle an inbound envelope. Envelopes without topic or payload are dropped.
    pub fn receive(&mut self, envelope: Envelope) {
        let Some((topic, payload)) = envelope.into_parts() else {
            debug!("Dropping envelope without topic or payload");
            return;
        };
        self.handle_message(&topic, &payload);
    }

    /// Handle a JSON data packet from the host. Malformed packets are dropped.
    pub fn receive_json(&mut self, json: &str) {
        match Envelope::from_json(json) {
            Ok(envelope) => self.receive(envelope),
            Err(e) => debug!("Dropping malformed envelope: {}", e),
        }
    }

    /// Route one message and apply the resulting update, if any.
    pub fn handle_message(&mut self, topic: &str, payload: &[u8]) -> Option<Field> {
        debug!(
            "MQTT In: {} | {}",
            topic,
            String::from_utf8_lossy(payload)
        );
        let update = self.router.route(topic, payload)?;
        let field = update.field();
        self.apply(update);
        Some(field)
    }

    pub fn lock(&mut self) {
        self.control(LockAction::Lock);
    }

    pub fn unlock(&mut self) {
        self.control(LockAction::Unlock);
    }

    pub fn unlatch(&mut self) {
        self.control(LockAction::Unlatch);
    }

    /// Host-driven control: write `value` to the field named `ident`.
    ///
    /// Only `LockAction` is writable, and only with an action code (1..=3).
    pub fn request_action(&mut self, ident: &str, value: &str) -> Result<LockAction> {
        let field: Field = ident.parse()?;
        if !field.accepts_action() {
            return Err(Error::UnsupportedField(ident.to_string()));
        }

        let action = LockAction::from_code(parse_int(value))
            .ok_or_else(|| Error::InvalidActionValue(value.to_string()))?;
        self.control(action);
        Ok(action)
    }

    /// Publish the command, then show it as requested until the lock reports back.
    fn control(&mut self, action: LockAction) {
        let message = action.encode(self.router.topics());
        debug!("MQTT Out: {} | {}", message.topic, message.payload);
        self.host.publish(message);
        self.apply(FieldUpdate::LockAction(action));
    }

    fn apply(&mut self, update: FieldUpdate) {
        if self.status.apply(&update) {
            self.host.field_changed(&update);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nuki::LockState;

    #[derive(Default)]
    struct RecordingHost {
        published: Vec<OutboundMessage>,
        subscriptions: Vec<String>,
        changes: Vec<FieldUpdate>,
    }

    impl Host for RecordingHost {
        fn publish(&mut self, message: OutboundMessage) {
            self.published.push(message);
        }

        fn set_subscription(&mut self, filter: &str) {
            self.subscriptions.push(filter.to_string());
        }

        fn field_changed(&mut self, update: &FieldUpdate) {
            self.changes.push(update.clone());
        }
    }

    fn lock() -> NukiLock<RecordingHost> {
        NukiLock::new(DeviceIdentity::default(), RecordingHost::default()).unwrap()
    }

    #[test]
    fn subscribes_on_creation() {
        let lock = lock();
        assert_eq!(lock.host().subscriptions, vec!["nuki/45A2F2BF/#"]);
    }

    #[test]
    fn route_updates_only_mapped_field() {
        let mut lock = lock();
        let field = lock.handle_message("nuki/45A2F2BF/batteryChargeState", b"64");

        assert_eq!(field, Some(Field::BatteryCharge));
        assert_eq!(lock.status().battery_charge(), Some(64));
        for other in Field::ALL.into_iter().filter(|f| *f != Field::BatteryCharge) {
            assert_eq!(lock.status().get(other), None, "{other} changed");
        }
    }

    #[test]
    fn foreign_topic_changes_nothing() {
        let mut lock = lock();
        assert_eq!(lock.handle_message("nuki/FFFFFFFF/lockState", b"1"), None);
        assert_eq!(*lock.status(), LockStatus::default());
        assert!(lock.host().changes.is_empty());
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let mut lock = lock();
        lock.handle_message("nuki/45A2F2BF/lockState", b"1");
        let once = lock.status().clone();
        lock.handle_message("nuki/45A2F2BF/lockState", b"1");

        assert_eq!(*lock.status(), once);
        assert_eq!(lock.host().changes, vec![FieldUpdate::LockState(1)]);
    }

    #[test]
    fn short_event_leaves_last_action() {
        let mut lock = lock();
        lock.handle_message("nuki/45A2F2BF/lockActionEvent", b"2,1,0,0,0");
        lock.handle_message("nuki/45A2F2BF/lockActionEvent", b"5");

        assert_eq!(lock.status().last_action(), Some("Lock via System"));
    }

    #[test]
    fn receive_drops_incomplete_envelopes() {
        let mut lock = lock();
        lock.receive(Envelope {
            topic: Some("nuki/45A2F2BF/lockState".into()),
            payload: None,
        });
        lock.receive(Envelope {
            topic: None,
            payload: Some(b"1".to_vec()),
        });
        lock.receive_json("{broken");
        assert_eq!(*lock.status(), LockStatus::default());

        lock.receive_json(r#"{"Topic":"nuki/45A2F2BF/connected","Payload":"true"}"#);
        assert_eq!(lock.status().connected(), Some(true));
    }

    #[test]
    fn commands_publish_and_set_action() {
        let mut lock = lock();
        lock.lock();
        lock.unlock();
        lock.unlatch();

        let payloads: Vec<&str> = lock
            .host()
            .published
            .iter()
            .map(|m| m.payload.as_str())
            .collect();
        assert_eq!(payloads, vec!["2", "1", "3"]);
        assert!(
            lock.host()
                .published
                .iter()
                .all(|m| m.topic == "nuki/45A2F2BF/lockAction" && m.qos == 0 && !m.retain)
        );
        assert_eq!(lock.status().lock_action(), Some(LockAction::Unlatch));
    }

    #[test]
    fn state_report_keeps_requested_action() {
        let mut lock = lock();
        lock.lock();
        assert_eq!(lock.status().lock_action(), Some(LockAction::Lock));
        assert_eq!(lock.status().lock_state(), None);

        lock.handle_message("nuki/45A2F2BF/lockState", b"1");
        assert_eq!(lock.status().lock_state(), Some(LockState::Locked));
        assert_eq!(lock.status().lock_action(), Some(LockAction::Lock));
    }

    #[test]
    fn request_action_unlocks() {
        let mut lock = lock();
        let action = lock.request_action("LockAction", "1").unwrap();

        assert_eq!(action, LockAction::Unlock);
        assert_eq!(lock.status().lock_action(), Some(LockAction::Unlock));
        assert_eq!(
            lock.host().published,
            vec![OutboundMessage::new("nuki/45A2F2BF/lockAction", "1")]
        );
    }

    #[test]
    fn request_action_rejects_other_fields() {
        let mut lock = lock();

        assert!(matches!(
            lock.request_action("unknownField", "1"),
            Err(Error::UnsupportedField(_))
        ));
        assert!(matches!(
            lock.request_action("LockState", "1"),
            Err(Error::UnsupportedField(_))
        ));
        assert!(lock.host().published.is_empty());
    }

    #[test]
    fn request_action_rejects_unknown_codes() {
        let mut lock = lock();

        for value in ["0", "4", "lock", ""] {
            assert!(matches!(
                lock.request_action("LockAction", value),
                Err(Error::InvalidActionValue(_))
            ));
        }
        assert!(lock.host().published.is_empty());
        assert_eq!(lock.status().lock_action(), None);
    }

    #[test]
    fn reconfigure_rederives_topics() {
        let mut lock = lock();
        lock.reconfigure(DeviceIdentity::new("home", "B2").unwrap()).unwrap();

        assert_eq!(
            lock.host().subscriptions,
            vec!["nuki/45A2F2BF/#", "home/B2/#"]
        );
        assert_eq!(lock.handle_message("nuki/45A2F2BF/lockState", b"1"), None);
        assert_eq!(
            lock.handle_message("home/B2/lockState", b"3"),
            Some(Field::LockState)
        );

        lock.lock();
        assert_eq!(lock.host().published[0].topic, "home/B2/lockAction");
    }

    #[test]
    fn reconfigure_rejects_invalid_identity() {
        let mut lock = lock();
        let bad = DeviceIdentity {
            base_topic: "nuki".into(),
            device_id: "a/b".into(),
        };

        assert!(lock.reconfigure(bad).is_err());
        assert_eq!(lock.identity(), &DeviceIdentity::default());
        assert_eq!(lock.host().subscriptions.len(), 1);
    }
}
