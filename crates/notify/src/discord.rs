//! Discord delivery through serenity's REST client.

use std::time::Duration;

use {
    async_trait::async_trait,
    lookout_catalog::Item,
    secrecy::{ExposeSecret, Secret},
    serenity::{
        http::{Http, HttpBuilder},
        model::id::ChannelId,
    },
    tracing::debug,
};

use crate::{Error, Result, render::render, sink::Notifier};

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts rendered listings to Discord text channels as the bot user.
pub struct DiscordNotifier {
    http: Http,
    send_timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(token: &Secret<String>) -> Self {
        Self::from_http(Http::new(token.expose_secret()))
    }

    /// Routes requests through a REST proxy that handles rate limits itself.
    pub fn with_proxy(token: &Secret<String>, proxy: impl Into<String>) -> Self {
        let http = HttpBuilder::new(token.expose_secret())
            .proxy(proxy)
            .ratelimiter_disabled(true)
            .build();
        Self::from_http(http)
    }

    fn from_http(http: Http) -> Self {
        Self {
            http,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }
}

fn parse_channel(channel_id: &str) -> Result<ChannelId> {
    channel_id
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(ChannelId::new)
        .ok_or_else(|| Error::invalid_channel(channel_id))
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, channel_id: &str, item: &Item) -> Result<()> {
        let channel = parse_channel(channel_id)?;
        let message = render(item).message;

        match tokio::time::timeout(self.send_timeout, channel.send_message(&self.http, message))
            .await
        {
            Err(_) => Err(Error::timeout(channel_id)),
            Ok(Err(e)) => Err(Error::delivery(channel_id, e)),
            Ok(Ok(_)) => {
                debug!(channel_id, url = %item.url, "listing delivered");
                Ok(())
            },
        }
    }
}
