use crate::media::{LocalMedia, TrackKind};
use meshcall_core::PeerId;

/// The UI surface this crate draws into, one tile per remote participant
/// plus the local preview. Implemented by the embedding layer.
pub trait Renderer: Send + Sync {
    /// Point the local preview at the current track set. An empty set
    /// blanks the preview.
    fn show_local_preview(&self, media: &LocalMedia);

    /// Create the tile for a remote participant. Must be idempotent: a
    /// second track on the same connection reuses the existing tile.
    fn attach_remote(&self, id: &PeerId);

    fn remove_remote(&self, id: &PeerId);

    /// Reflect the current mute state of a local track kind.
    fn set_mute_indicator(&self, kind: TrackKind, enabled: bool);
}
