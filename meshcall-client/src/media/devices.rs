use crate::error::CaptureError;
use crate::media::LocalMedia;
use async_trait::async_trait;

/// Which of {audio, video} can be captured right now. Recomputed before
/// every capture attempt: devices appear and disappear mid-call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallCapabilities {
    pub audio: bool,
    pub video: bool,
}

impl CallCapabilities {
    pub fn any(&self) -> bool {
        self.audio || self.video
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    AudioInput,
    VideoInput,
    Other,
}

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub kind: DeviceKind,
    pub label: String,
}

/// The platform's capture surface. The real thing lives outside this
/// crate (a browser, an OS capture layer); everything here talks to it
/// through this seam.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn enumerate_devices(&self) -> Vec<DeviceInfo>;

    /// Acquire a fresh track set for the requested capabilities. Only
    /// called with at least one capability set.
    async fn get_user_media(&self, caps: CallCapabilities) -> Result<LocalMedia, CaptureError>;
}
