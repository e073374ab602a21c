pub mod call;
pub mod error;
pub mod media;
pub mod render;
pub mod signaling;
pub mod transport;
pub mod ws;

pub use call::{CallCommand, CallController, NegotiationState};
pub use error::{CaptureError, NegotiationError};
pub use media::{
    CallCapabilities, DeviceInfo, DeviceKind, LocalMedia, LocalMediaManager, LocalTrack,
    MediaDevices, TrackKind,
};
pub use render::Renderer;
pub use signaling::SignalingSink;
pub use transport::{
    CallConfig, PeerTransport, PeerTransportFactory, TransportEvent, WebrtcTransport,
    WebrtcTransportFactory,
};
pub use ws::WsSignaling;
