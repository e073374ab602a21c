use meshcall_core::{PeerId, ServerMessage};
use meshcall_server::SessionRegistry;
use tokio::sync::mpsc;

/// Register a fresh participant and hand back its id plus the channel the
/// relay will deliver into.
pub fn connect(registry: &SessionRegistry) -> (PeerId, mpsc::UnboundedReceiver<ServerMessage>) {
    let id = PeerId::new();
    let (tx, rx) = mpsc::unbounded_channel();
    registry.register(id.clone(), tx);
    (id, rx)
}

/// Drain everything currently queued for a participant. Registry dispatch
/// is synchronous, so by the time this runs all deliveries have landed.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}
