// Gateway server
//
// Accepts WebSocket connections and runs one pump task per connection:
// inbound text frames go to the dispatcher, deliveries from the broadcast
// channel go out to the socket. Disconnect cleanup runs on every exit path,
// so a user is taken offline whether the peer closed cleanly or the link
// just died.

use crate::broadcast::{ChannelBroadcaster, Delivery};
use crate::dispatcher::Dispatcher;
use crate::protocol::ClientFrame;
use anyhow::{Context, Result};
use futures_util::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Broadcast channel capacity; a connection that falls further behind
    /// than this skips frames instead of blocking the senders
    pub fanout_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            fanout_capacity: 256,
        }
    }
}

/// Presence gateway server
pub struct Gateway {
    config: GatewayConfig,
    broadcaster: Arc<ChannelBroadcaster>,
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        let broadcaster = Arc::new(ChannelBroadcaster::new(config.fanout_capacity));
        let dispatcher = Arc::new(Dispatcher::new(broadcaster.clone()));
        Self {
            config,
            broadcaster,
            dispatcher,
        }
    }

    /// Dispatcher reference, for status reporting
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    pub async fn start(self) -> Result<()> {
        use tokio::net::TcpListener;

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        tracing::info!("Presence gateway listening on {}", addr);

        loop {
            if let Ok((stream, addr)) = listener.accept().await {
                let dispatcher = self.dispatcher.clone();
                let delivery_rx = self.broadcaster.subscribe();
                tokio::spawn(async move {
                    if let Err(e) =
                        handle_connection(stream, addr.to_string(), dispatcher, delivery_rx).await
                    {
                        tracing::error!("Connection error: {}", e);
                    }
                });
            }
        }
    }
}

// Handle one WebSocket connection for its whole lifetime
async fn handle_connection(
    stream: tokio::net::TcpStream,
    addr: String,
    dispatcher: Arc<Dispatcher>,
    mut delivery_rx: broadcast::Receiver<Delivery>,
) -> Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream)
        .await
        .context("WebSocket handshake failed")?;

    let socket_id = uuid::Uuid::new_v4().to_string();
    tracing::info!("WebSocket connection {} established from {}", socket_id, addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split::<Message>();

    loop {
        tokio::select! {
            // Inbound client frames
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(msg)) => {
                        if msg.is_text() {
                            let text = match msg.to_text() {
                                Ok(text) => text,
                                Err(e) => {
                                    tracing::debug!("dropping non-utf8 frame from {}: {}", socket_id, e);
                                    continue;
                                }
                            };
                            match serde_json::from_str::<ClientFrame>(text) {
                                Ok(frame) => dispatcher.handle_frame(&socket_id, frame).await,
                                // Fail-open: malformed frames are dropped,
                                // never answered with an error
                                Err(e) => {
                                    tracing::debug!("dropping malformed frame from {}: {}", socket_id, e);
                                }
                            }
                        } else if msg.is_close() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error on {}: {}", socket_id, e);
                        break;
                    }
                    None => break,
                }
            }

            // Outbound deliveries fanned out by the dispatcher
            delivery_result = delivery_rx.recv() => {
                match delivery_result {
                    Ok(delivery) => {
                        if !delivery.is_for(&socket_id) {
                            continue;
                        }
                        let frame = match serde_json::to_string(&delivery.frame) {
                            Ok(frame) => frame,
                            Err(e) => {
                                tracing::error!("failed to encode outbound frame: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = ws_sender.send(Message::Text(frame.into())).await {
                            tracing::debug!("send to {} failed: {}", socket_id, e);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("connection {} lagged, skipped {} frames", socket_id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // Terminal state transition for this connection; runs for network drops
    // and clean closes alike
    dispatcher.handle_disconnect(&socket_id).await;
    tracing::info!("Connection {} closed", socket_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.fanout_capacity, 256);
    }

    #[tokio::test]
    async fn test_gateway_starts_with_empty_state() {
        let gateway = Gateway::new(GatewayConfig::default());
        let dispatcher = gateway.dispatcher();

        assert!(dispatcher.online_users().await.is_empty());
        assert_eq!(dispatcher.connection_count().await, 0);
    }
}
