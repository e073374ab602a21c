use crate::error::CaptureError;
use crate::media::{CallCapabilities, DeviceKind, LocalTrack, MediaDevices, TrackKind};
use std::sync::Arc;
use tracing::info;

/// The locally captured track set: at most one track per kind.
#[derive(Default, Clone)]
pub struct LocalMedia {
    audio: Option<Arc<LocalTrack>>,
    video: Option<Arc<LocalTrack>>,
}

impl LocalMedia {
    pub fn new(audio: Option<Arc<LocalTrack>>, video: Option<Arc<LocalTrack>>) -> Self {
        Self { audio, video }
    }

    pub fn track(&self, kind: TrackKind) -> Option<&Arc<LocalTrack>> {
        match kind {
            TrackKind::Audio => self.audio.as_ref(),
            TrackKind::Video => self.video.as_ref(),
        }
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Arc<LocalTrack>> {
        self.audio.iter().chain(self.video.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.video.is_none()
    }

    pub fn stop_all(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }
}

/// Owns the live `LocalMedia` and is the only place that mutates it.
/// Peer links read it to attach or swap outgoing tracks, nothing more.
pub struct LocalMediaManager {
    devices: Arc<dyn MediaDevices>,
    media: LocalMedia,
}

impl LocalMediaManager {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self {
            devices,
            media: LocalMedia::default(),
        }
    }

    pub fn media(&self) -> &LocalMedia {
        &self.media
    }

    /// Re-enumerates on every call; a cached answer would go stale the
    /// moment a device is unplugged.
    pub async fn current_capabilities(&self) -> CallCapabilities {
        let devices = self.devices.enumerate_devices().await;
        CallCapabilities {
            audio: devices.iter().any(|d| d.kind == DeviceKind::AudioInput),
            video: devices.iter().any(|d| d.kind == DeviceKind::VideoInput),
        }
    }

    /// Replace the track set wholesale. Old tracks are stopped and let go
    /// before the new set is acquired, so device locks are released
    /// promptly and a failed acquisition leaves no stopped track behind
    /// for `toggle` to flip. With zero capable devices this yields an
    /// empty set and is not an error.
    pub async fn start_capture(&mut self) -> Result<(), CaptureError> {
        let caps = self.current_capabilities().await;

        self.media.stop_all();
        self.media = LocalMedia::default();

        if !caps.any() {
            info!("No capture devices available, continuing with empty local media");
            return Ok(());
        }

        self.media = self.devices.get_user_media(caps).await?;
        Ok(())
    }

    /// Flip the mute flag on the current track of `kind` in place; no
    /// stop, no replacement, no renegotiation. Returns the new enabled
    /// state, or `None` when no such track is live.
    pub fn toggle(&self, kind: TrackKind) -> Option<bool> {
        self.media.track(kind).map(|track| track.toggle())
    }
}
