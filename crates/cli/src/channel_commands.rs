//! CLI subcommands for persisted channel configuration.
//!
//! These edit the channels file directly; a running `lookout run` picks the
//! changes up on its next start.

use {
    anyhow::{Result, bail},
    clap::Subcommand,
    lookout_catalog::parse_filter_url,
    lookout_config::LookoutConfig,
    lookout_monitor::{store::ChannelStore, store_file::FileStore},
};

#[derive(Subcommand)]
pub enum ChannelAction {
    /// List configured channels.
    List,
    /// Print one channel's filter as JSON.
    Show { channel_id: String },
    /// Configure a channel from a catalog search URL.
    Add {
        channel_id: String,
        url: String,
        /// Refuse later reconfiguration from chat commands.
        #[arg(long, default_value_t = false)]
        readonly: bool,
        /// Replace the channel even if it is readonly.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Remove a channel's configuration.
    Remove { channel_id: String },
}

pub async fn handle_channels(action: &ChannelAction, config: &LookoutConfig) -> Result<()> {
    let store = FileStore::new(config.channels_path());
    for line in run_action(action, &store).await? {
        println!("{line}");
    }
    Ok(())
}

async fn run_action(action: &ChannelAction, store: &dyn ChannelStore) -> Result<Vec<String>> {
    match action {
        ChannelAction::List => {
            let channels = store.load().await?;
            if channels.is_empty() {
                return Ok(vec!["No channels configured.".into()]);
            }
            Ok(channels
                .iter()
                .map(|c| {
                    let lock = if c.filter.readonly { " [readonly]" } else { "" };
                    format!(
                        "  {}: \"{}\" {}-{} {}{lock}",
                        c.channel_id,
                        c.filter.search_text,
                        c.filter.price_min,
                        c.filter.price_max,
                        c.filter.currency
                    )
                })
                .collect())
        },
        ChannelAction::Show { channel_id } => {
            let channels = store.load().await?;
            match channels.iter().find(|c| &c.channel_id == channel_id) {
                Some(c) => Ok(vec![serde_json::to_string_pretty(&c.filter)?]),
                None => bail!("channel {channel_id} is not configured"),
            }
        },
        ChannelAction::Add {
            channel_id,
            url,
            readonly,
            force,
        } => {
            let existing = store.load().await?;
            if !force
                && existing
                    .iter()
                    .any(|c| &c.channel_id == channel_id && c.filter.readonly)
            {
                bail!("channel {channel_id} is readonly; pass --force to replace it");
            }
            let filter = parse_filter_url(url)?.with_readonly(*readonly);
            store.upsert(channel_id, &filter).await?;
            Ok(vec![format!("Configured channel {channel_id}.")])
        },
        ChannelAction::Remove { channel_id } => {
            if store.remove(channel_id).await? {
                Ok(vec![format!("Removed channel {channel_id}.")])
            } else {
                Ok(vec![format!("Channel {channel_id} was not configured.")])
            }
        },
    }
}
