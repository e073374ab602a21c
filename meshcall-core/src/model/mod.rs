mod peer;
mod signaling;

pub use peer::PeerId;
pub use signaling::{ClientMessage, IceServerConfig, ServerMessage};
