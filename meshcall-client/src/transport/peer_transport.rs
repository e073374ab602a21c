use crate::error::NegotiationError;
use crate::media::LocalTrack;
use async_trait::async_trait;
use meshcall_core::PeerId;
use std::sync::Arc;
use tokio::sync::mpsc;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;

/// Events a peer transport surfaces into the call controller's loop.
pub enum TransportEvent {
    /// A local ICE candidate was discovered and should be trickled to the
    /// remote side.
    CandidateGenerated(PeerId, String),
    /// First media arrived from the remote side.
    RemoteTrackStarted(PeerId),
    /// ICE connectivity moved to a new state.
    ConnectivityChanged(PeerId, RTCIceConnectionState),
}

/// One direct connection to one remote participant. Offer/answer and ICE
/// plumbing only; who calls what and when is the controller's business.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Create an offer requesting audio and video reception and install
    /// it as the local description.
    async fn create_offer(&self) -> Result<String, NegotiationError>;

    /// Create an answer to the current remote offer and install it as the
    /// local description.
    async fn create_answer(&self) -> Result<String, NegotiationError>;

    async fn set_remote_offer(&self, sdp: String) -> Result<(), NegotiationError>;

    async fn set_remote_answer(&self, sdp: String) -> Result<(), NegotiationError>;

    /// Apply a trickled remote candidate. Valid in any negotiation state.
    async fn add_ice_candidate(&self, candidate: String) -> Result<(), NegotiationError>;

    /// Attach a local track as an outgoing sender.
    async fn add_track(&self, track: Arc<LocalTrack>) -> Result<(), NegotiationError>;

    /// Swap the outgoing source for `track.kind()` in place, without
    /// renegotiation. A kind that was never attached is left alone.
    async fn replace_track(&self, track: Arc<LocalTrack>) -> Result<(), NegotiationError>;

    async fn close(&self);
}

#[async_trait]
pub trait PeerTransportFactory: Send + Sync {
    /// Build a transport for `peer_id` that reports its events into
    /// `events`.
    async fn create(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> anyhow::Result<Arc<dyn PeerTransport>>;
}
