mod config;
mod peer_transport;
mod webrtc_transport;

pub use config::*;
pub use peer_transport::*;
pub use webrtc_transport::*;
