use async_trait::async_trait;
use meshcall_client::SignalingSink;
use meshcall_core::{ClientMessage, PeerId};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingSink that captures all outgoing messages.
#[derive(Clone)]
pub struct MockSignalingSink {
    /// Channel to forward captured messages.
    tx: mpsc::UnboundedSender<ClientMessage>,
    /// All captured messages (for verification).
    sent: Arc<Mutex<Vec<ClientMessage>>>,
}

impl MockSignalingSink {
    /// Create a new MockSignalingSink and its receiver channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        (sink, rx)
    }

    pub async fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().await.clone()
    }

    /// Get all SDP offers addressed to a specific peer.
    pub async fn offers_to(&self, peer_id: &PeerId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                ClientMessage::Call { offer, to } if to == peer_id => Some(offer.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get all SDP answers addressed to a specific peer.
    pub async fn answers_to(&self, peer_id: &PeerId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                ClientMessage::MakeAnswer { answer, to } if to == peer_id => Some(answer.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get all ICE candidates addressed to a specific peer.
    pub async fn candidates_to(&self, peer_id: &PeerId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                ClientMessage::IceCandidate { candidate, to } if to == peer_id => {
                    Some(candidate.clone())
                }
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SignalingSink for MockSignalingSink {
    async fn send(&self, msg: ClientMessage) {
        tracing::debug!("[MockSignaling] send {:?}", msg);

        self.sent.lock().await.push(msg.clone());
        let _ = self.tx.send(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_sink_captures_offers() {
        let (sink, mut rx) = MockSignalingSink::new();
        let peer_id = PeerId::new();

        sink.send(ClientMessage::Call {
            offer: "test-sdp".into(),
            to: peer_id.clone(),
        })
        .await;

        let msg = rx.recv().await.unwrap();
        assert!(matches!(msg, ClientMessage::Call { .. }));

        let offers = sink.offers_to(&peer_id).await;
        assert_eq!(offers, vec!["test-sdp".to_string()]);
    }
}
