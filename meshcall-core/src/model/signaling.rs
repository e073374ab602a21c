use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Everything a participant may send to the relay. The relay stamps the
/// sender id on whatever it routes, so none of these carry a `from`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Announce presence; the relay fans a `new-user` notice out to
    /// everyone else.
    StartInCall,
    /// SDP offer addressed to one participant.
    Call { offer: String, to: PeerId },
    /// SDP answer addressed to one participant.
    MakeAnswer { answer: String, to: PeerId },
    /// Trickled ICE candidate addressed to one participant.
    IceCandidate { candidate: String, to: PeerId },
}

/// Everything the relay may deliver to a participant. `id` is always the
/// participant the payload originated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerMessage {
    NewUser { id: PeerId },
    CallMade { offer: String, id: PeerId },
    AnswerMade { answer: String, id: PeerId },
    AddIceCandidate { candidate: String, id: PeerId },
}
