use nuki_mqtt_bridge::{bridge, config, control, mqtt, nuki};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting nuki-mqtt-bridge (mqtt={}:{}, client_id={})",
        config.mqtt.broker_host,
        config.mqtt.broker_port,
        config.mqtt.client_id,
    );

    // Channels
    let (inbound_tx, mut inbound_rx) = mpsc::channel::<nuki::Envelope>(100);
    let (request_tx, request_rx) = mpsc::channel::<mqtt::Request>(100);

    // The lock queues its subscription before the MQTT task starts polling.
    let host = bridge::MqttHost::new(request_tx);
    let mut lock = match nuki::NukiLock::new(config.lock.clone(), host) {
        Ok(lock) => lock,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Lock topics: {}", lock.topics().subscription());

    let mqtt_client = mqtt::client::MqttClient::new(&config.mqtt);
    let mqtt_handle = tokio::spawn(async move {
        mqtt_client.run(inbound_tx, request_rx).await;
    });

    let mut control_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut control_open = true;

    // Main loop: one inbound message or control command at a time
    loop {
        tokio::select! {
            Some(envelope) = inbound_rx.recv() => {
                lock.receive(envelope);
            }
            line = control_lines.next_line(), if control_open => {
                match line {
                    Ok(Some(line)) => match control::parse_line(&line) {
                        Some(command) => {
                            if let Err(e) = bridge::execute(&mut lock, command) {
                                warn!("Command rejected: {}", e);
                            }
                        }
                        None if line.trim().is_empty() => {}
                        None => warn!("Unrecognised control line: {}", line),
                    },
                    Ok(None) => {
                        info!("Control input closed");
                        control_open = false;
                    }
                    Err(e) => {
                        warn!("Failed to read control input: {}", e);
                        control_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down");
                break;
            }
            _ = async {
                let mut sigterm = tokio::signal::unix::signal(
                    tokio::signal::unix::SignalKind::terminate()
                ).expect("Failed to register SIGTERM handler");
                sigterm.recv().await;
            } => {
                info!("Received SIGTERM, shutting down");
                break;
            }
        }
    }

    mqtt_handle.abort();
    info!("nuki-mqtt-bridge stopped");
}
