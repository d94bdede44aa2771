use rumqttc::{AsyncClient, Event, EventLoop, Incoming, MqttOptions, QoS};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::MqttConfig;
use crate::nuki::{Envelope, OutboundMessage};

use super::Request;

pub struct MqttClient {
    client: AsyncClient,
    eventloop: EventLoop,
    subscription: Option<String>,
}

impl MqttClient {
    pub fn new(config: &MqttConfig) -> Self {
        let mut mqttopts =
            MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
        mqttopts.set_keep_alive(std::time::Duration::from_secs(30));

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            mqttopts.set_credentials(user, pass);
        }

        let (client, eventloop) = AsyncClient::new(mqttopts, 100);

        Self {
            client,
            eventloop,
            subscription: None,
        }
    }

    /// Run the MQTT event loop. Forwards incoming publishes through
    /// `inbound_tx` and carries out publish/subscribe requests from `request_rx`.
    /// The current subscription is renewed on every (re)connect.
    pub async fn run(
        mut self,
        inbound_tx: mpsc::Sender<Envelope>,
        mut request_rx: mpsc::Receiver<Request>,
    ) {
        loop {
            tokio::select! {
                event = self.eventloop.poll() => {
                    match event {
                        Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                            info!("Connected to MQTT broker");
                            if let Some(filter) = &self.subscription {
                                if let Err(e) =
                                    self.client.subscribe(filter, QoS::AtMostOnce).await
                                {
                                    error!("Failed to subscribe to {}: {}", filter, e);
                                }
                            }
                        }
                        Ok(Event::Incoming(Incoming::Publish(publish))) => {
                            let envelope = Envelope::new(publish.topic, publish.payload.to_vec());
                            if inbound_tx.send(envelope).await.is_err() {
                                warn!("Inbound channel closed");
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("MQTT connection error: {}. Reconnecting...", e);
                            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        }
                    }
                }
                Some(request) = request_rx.recv() => {
                    match request {
                        Request::Publish(message) => self.publish(message).await,
                        Request::Subscribe(filter) => self.resubscribe(filter).await,
                    }
                }
            }
        }
    }

    async fn publish(&mut self, message: OutboundMessage) {
        info!("Publishing {}: {}", message.topic, message.payload);
        if let Err(e) = self
            .client
            .publish(
                &message.topic,
                qos(message.qos),
                message.retain,
                message.payload.into_bytes(),
            )
            .await
        {
            warn!("Failed to publish {}: {}", message.topic, e);
        }
    }

    async fn resubscribe(&mut self, filter: String) {
        if self.subscription.as_deref() == Some(filter.as_str()) {
            return;
        }
        if let Some(old) = self.subscription.take() {
            if let Err(e) = self.client.unsubscribe(&old).await {
                warn!("Failed to unsubscribe from {}: {}", old, e);
            }
        }
        info!("Subscribing to {}", filter);
        if let Err(e) = self.client.subscribe(&filter, QoS::AtMostOnce).await {
            error!("Failed to subscribe to {}: {}", filter, e);
        }
        self.subscription = Some(filter);
    }
}

fn qos(level: u8) -> QoS {
    match level {
        2 => QoS::ExactlyOnce,
        1 => QoS::AtLeastOnce,
        _ => QoS::AtMostOnce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn run_future_is_send() {
        let config = MqttConfig {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            username: None,
            password: None,
            client_id: "nuki-mqtt-bridge-test".to_string(),
        };
        let (inbound_tx, _inbound_rx) = mpsc::channel(1);
        let (_request_tx, request_rx) = mpsc::channel(1);

        let run = MqttClient::new(&config).run(inbound_tx, request_rx);
        assert_send(&run);
    }

    #[test]
    fn qos_levels() {
        assert_eq!(qos(0), QoS::AtMostOnce);
        assert_eq!(qos(1), QoS::AtLeastOnce);
        assert_eq!(qos(2), QoS::ExactlyOnce);
        assert_eq!(qos(7), QoS::AtMostOnce);
    }
}
