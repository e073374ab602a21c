use thiserror::Error;

/// Local media acquisition was denied or could not be satisfied. Logged
/// and swallowed at the call boundary: the session continues with
/// degraded or absent local media.
#[derive(Debug, Error)]
#[error("media capture failed: {0}")]
pub struct CaptureError(pub String);

/// Failure while constructing or applying a session description or an ICE
/// candidate. Caught at the reaction that triggered the operation; never
/// aborts other peer links.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("webrtc error: {0}")]
    Rtc(#[from] webrtc::Error),

    #[error("malformed ICE candidate: {0}")]
    BadCandidate(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
