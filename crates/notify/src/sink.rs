use {async_trait::async_trait, lookout_catalog::Item, tracing::info};

use crate::{Result, render::render};

/// Delivers one listing notification to a channel.
///
/// Failures are reported to the caller, which logs them; there is no retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel_id: &str, item: &Item) -> Result<()>;
}

/// Renders and logs instead of sending. Used for dry runs.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, channel_id: &str, item: &Item) -> Result<()> {
        let notification = render(item);
        info!(
            channel_id,
            title = %notification.title,
            url = %notification.url,
            "new listing (dry run)"
        );
        Ok(())
    }
}
