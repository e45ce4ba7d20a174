//! Scene-text overlay interface (OBS integration seam).

use async_trait::async_trait;

/// Fire-and-forget text overlay update.
///
/// Implementations must never block the caller on remote I/O and must
/// swallow delivery failures; the overlay is cosmetic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SceneText: Send + Sync {
    async fn set_text(&self, text: &str);
}
