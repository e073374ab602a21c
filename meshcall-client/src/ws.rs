use crate::signaling::SignalingSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use meshcall_core::{ClientMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

/// Production signaling connection: one WebSocket to the relay. Outbound
/// messages go through an unbounded channel so `send` never blocks a
/// negotiation reaction; decoded inbound signals come back on the
/// returned receiver for the embedder to feed into the call controller.
pub struct WsSignaling {
    tx: mpsc::UnboundedSender<Message>,
}

impl WsSignaling {
    pub async fn connect(
        url: &str,
    ) -> Result<(Arc<Self>, mpsc::UnboundedReceiver<ServerMessage>)> {
        let (ws_stream, _) = connect_async(url)
            .await
            .context("Failed to connect to signaling relay")?;
        info!("Connected to signaling relay at {}", url);

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if ws_sender.send(msg).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(Ok(msg)) = ws_receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(signal) => {
                                if inbound_tx.send(signal).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Invalid message from relay: {:?}", e),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            info!("Signaling connection closed");
        });

        Ok((Arc::new(Self { tx }), inbound_rx))
    }
}

#[async_trait]
impl SignalingSink for WsSignaling {
    async fn send(&self, msg: ClientMessage) {
        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize signaling message: {}", e);
                return;
            }
        };
        if self.tx.send(Message::Text(json.into())).is_err() {
            warn!("Signaling connection is gone, dropping message");
        }
    }
}
