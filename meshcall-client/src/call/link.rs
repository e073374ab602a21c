use crate::transport::PeerTransport;
use std::sync::Arc;

/// Where one peer link stands in the offer/answer exchange. `Closed` is
/// terminal and reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    HaveLocalOffer,
    HaveRemoteOffer,
    Answered,
    Stable,
    Closed,
}

/// Client-side state for one direct connection to one remote participant.
pub struct PeerLink {
    pub transport: Arc<dyn PeerTransport>,
    pub state: NegotiationState,
    pub tracks_attached: bool,
}

impl PeerLink {
    pub fn new(transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            transport,
            state: NegotiationState::New,
            tracks_attached: false,
        }
    }
}
