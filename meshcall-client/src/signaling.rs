use async_trait::async_trait;
use meshcall_core::ClientMessage;

/// Outbound half of the signaling channel. Fire-and-forget: a relay that
/// went away mid-call is indistinguishable from a recipient that did, and
/// neither is this side's error.
#[async_trait]
pub trait SignalingSink: Send + Sync {
    async fn send(&self, msg: ClientMessage);
}
