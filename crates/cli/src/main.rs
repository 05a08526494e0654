mod channel_commands;
mod run_command;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    lookout_config::LookoutConfig,
    tracing::warn,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "lookout",
    version,
    about = "Lookout: new marketplace listings, straight to your channels"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true, env = "LOOKOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Channel configuration file (overrides config value).
    #[arg(long, global = true)]
    channels_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configured channel monitor (default when no subcommand is provided).
    Run {
        /// Log rendered listings instead of posting them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Inspect or edit persisted channel configuration.
    Channels {
        #[command(subcommand)]
        action: channel_commands::ChannelAction,
    },
    /// Parse a catalog search URL and print the resulting filter.
    Parse {
        /// Catalog search URL copied from the browser.
        url: String,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> LookoutConfig {
    let mut config = match &cli.config {
        Some(path) => match lookout_config::load_config(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                LookoutConfig::default()
            },
        },
        None => lookout_config::discover_and_load(),
    };
    if cli.config.is_some() {
        lookout_config::apply_env_overrides(&mut config);
    }
    if let Some(path) = &cli.channels_path {
        config.storage.channels_path = Some(path.clone());
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    match &cli.command {
        None => run_command::handle_run(load_config(&cli), false).await,
        Some(Commands::Run { dry_run }) => {
            run_command::handle_run(load_config(&cli), *dry_run).await
        },
        Some(Commands::Channels { action }) => {
            channel_commands::handle_channels(action, &load_config(&cli)).await
        },
        Some(Commands::Parse { url }) => {
            let filter = lookout_catalog::parse_filter_url(url)?;
            println!("{}", serde_json::to_string_pretty(&filter)?);
            Ok(())
        },
    }
}
