//! UI collaborator seam for dialog confirmation and toasts.
//!
//! The core never renders anything: domain refresh in dialog mode asks the
//! embedding application to confirm before committing, and image-host
//! refresh may announce the selected line. [`SilentUi`] is the default for
//! headless use.

use async_trait::async_trait;
use tracing::debug;

/// Object-safe UI collaborator.
#[async_trait]
pub trait SourceUi: Send + Sync {
    /// Shows a confirmation dialog; returns true when the user accepts.
    async fn confirm(&self, title: &str, message: &str) -> bool;

    /// Shows a fire-and-forget toast message.
    fn toast(&self, message: &str);
}

/// Headless UI: declines every confirmation and logs toasts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentUi;

#[async_trait]
impl SourceUi for SilentUi {
    async fn confirm(&self, title: &str, _message: &str) -> bool {
        debug!(title, "silent UI declining confirmation dialog");
        false
    }

    fn toast(&self, message: &str) {
        debug!(message, "toast");
    }
}
