//! `lookout run`: restore every channel and poll until Ctrl-C.

use std::sync::Arc;

use {
    anyhow::{Context, Result, anyhow},
    lookout_catalog::{CatalogClientConfig, HttpCatalogClient},
    lookout_config::LookoutConfig,
    lookout_monitor::{
        monitor::MonitorSettings,
        service::{WatchConfig, WatchService},
        store_file::FileStore,
    },
    lookout_notify::{DiscordNotifier, LogNotifier, Notifier},
    tracing::info,
};

pub fn watch_config(config: &LookoutConfig) -> WatchConfig {
    WatchConfig {
        monitor: MonitorSettings {
            poll_min: config.monitor.poll_min(),
            poll_max: config.monitor.poll_max(),
            max_items_per_tick: config.monitor.per_tick_limit(),
        },
        reclaim_interval: config.monitor.reclaim_interval(),
    }
}

fn catalog_config(config: &LookoutConfig) -> CatalogClientConfig {
    CatalogClientConfig {
        base_url: config.catalog.base_url.clone(),
        page_size: config.catalog.page_size,
        request_timeout: config.catalog.request_timeout(),
        warm_up: config.catalog.warm_up,
    }
}

fn notifier(config: &LookoutConfig, dry_run: bool) -> Result<Arc<dyn Notifier>> {
    if dry_run {
        return Ok(Arc::new(LogNotifier));
    }
    let token = config.discord.token.clone().ok_or_else(|| {
        anyhow!(
            "no Discord token configured; set {} or discord.token, or pass --dry-run",
            lookout_config::loader::TOKEN_ENV
        )
    })?;
    let notifier = match &config.discord.proxy {
        Some(proxy) => DiscordNotifier::with_proxy(&token, proxy.as_str()),
        None => DiscordNotifier::new(&token),
    };
    Ok(Arc::new(notifier.with_timeout(config.discord.send_timeout())))
}

#[cfg(feature = "metrics")]
fn init_metrics() -> Result<lookout_metrics::MetricsHandle> {
    lookout_metrics::init_metrics(lookout_metrics::MetricsRecorderConfig {
        enabled: true,
        ..Default::default()
    })
    .context("failed to install metrics recorder")
}

pub async fn handle_run(config: LookoutConfig, dry_run: bool) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), dry_run, "lookout starting");
    #[cfg(feature = "metrics")]
    let metrics = init_metrics()?;

    let notifier = notifier(&config, dry_run)?;
    let catalog = HttpCatalogClient::new(catalog_config(&config))
        .context("failed to build catalog HTTP client")?;
    let channels_path = config.channels_path();
    let store = Arc::new(FileStore::new(&channels_path));

    let service = WatchService::with_config(store, Arc::new(catalog), notifier, watch_config(&config));
    let restored = service.restore_all().await;
    service.start_reclaim().await;
    info!(
        restored,
        path = %channels_path.display(),
        "monitoring; press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("shutting down");
    service.shutdown().await;
    #[cfg(feature = "metrics")]
    info!(snapshot = %metrics.render(), "final metrics");
    Ok(())
}
