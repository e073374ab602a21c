use dashmap::DashMap;
use meshcall_core::{ClientMessage, PeerId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

struct RegistryInner {
    participants: DashMap<PeerId, mpsc::UnboundedSender<ServerMessage>>,
}

/// Relay-side participant registry: one entry per live transport
/// connection. Routing to an id that is not registered is a silent no-op —
/// in real-time signaling a missing recipient means the call intent
/// expired, not that something went wrong.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                participants: DashMap::new(),
            }),
        }
    }

    pub fn register(&self, id: PeerId, tx: mpsc::UnboundedSender<ServerMessage>) {
        self.inner.participants.insert(id, tx);
    }

    pub fn unregister(&self, id: &PeerId) {
        self.inner.participants.remove(id);
    }

    pub fn len(&self) -> usize {
        self.inner.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.participants.is_empty()
    }

    /// Route one inbound message, stamping the sender id on whatever goes
    /// back out. This is the whole relay: one broadcast kind, three
    /// unicast kinds.
    pub fn dispatch(&self, from: &PeerId, msg: ClientMessage) {
        match msg {
            ClientMessage::StartInCall => self.broadcast_new_user(from),
            ClientMessage::Call { offer, to } => self.send(
                &to,
                ServerMessage::CallMade {
                    offer,
                    id: from.clone(),
                },
            ),
            ClientMessage::MakeAnswer { answer, to } => self.send(
                &to,
                ServerMessage::AnswerMade {
                    answer,
                    id: from.clone(),
                },
            ),
            ClientMessage::IceCandidate { candidate, to } => self.send(
                &to,
                ServerMessage::AddIceCandidate {
                    candidate,
                    id: from.clone(),
                },
            ),
        }
    }

    /// Deliver a `new-user` notice to every registered participant except
    /// `id` itself.
    pub fn broadcast_new_user(&self, id: &PeerId) {
        info!("Participant {} started a call", id);

        for entry in self.inner.participants.iter() {
            if entry.key() == id {
                continue;
            }
            let _ = entry.value().send(ServerMessage::NewUser { id: id.clone() });
        }
    }

    /// Best-effort unicast. A closed channel is treated the same as an
    /// unknown recipient: the connection is on its way out.
    pub fn send(&self, to: &PeerId, msg: ServerMessage) {
        match self.inner.participants.get(to) {
            Some(tx) => {
                if tx.send(msg).is_err() {
                    debug!("Recipient {} is shutting down, dropping message", to);
                }
            }
            None => debug!("Recipient {} is not registered, dropping message", to),
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
