use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use jemallocator::Jemalloc;
use ticket_traffic::{
    client::{self, HttpClient},
    config::{self, Config},
    pipeline::{self, Pipeline},
};
use tokio::{
    runtime::Builder,
    signal,
    time::Duration,
};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::Error),
    #[error("Failed to create service client: {0}")]
    Client(#[from] client::Error),
    #[error("Pipeline returned an error: {0}")]
    Pipeline(#[from] pipeline::Error),
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// path on disk to the configuration file, built-in defaults apply when
    /// absent
    #[clap(long, global = true)]
    config_path: Option<PathBuf>,
    /// the maximum time to wait, in seconds, for spawned tasks at shutdown
    #[clap(long, default_value_t = 5)]
    max_shutdown_delay: u16,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq, Debug)]
enum Commands {
    /// Run the load generator, the default
    Run,
    /// Validate configuration and exit
    ConfigCheck,
}

fn get_config(config_path: Option<&Path>) -> Result<Config, Error> {
    let config = match config_path {
        Some(path) => {
            debug!("Attempting to open configuration file at: {}", path.display());
            Config::load(path).map_err(|err| {
                error!("Configuration validation failed: {err}");
                err
            })?
        }
        None => {
            debug!("No configuration file given, using defaults");
            Config::default()
        }
    };
    Ok(config)
}

async fn inner_main(config: Config) -> Result<(), Error> {
    let client = HttpClient::new(&config.target_uri)?;
    let pipeline = Pipeline::new(config, client);

    tokio::select! {
        res = pipeline.run() => {
            if let Err(err) = res {
                error!("Pipeline shut down unexpectedly: {err}");
                return Err(Error::Pipeline(err));
            }
            Ok(())
        }
        _ = signal::ctrl_c() => {
            info!("received ctrl-c");
            Ok(())
        }
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .finish()
        .init();

    let version = env!("CARGO_PKG_VERSION");
    info!("Starting ticket-traffic {version} run.");

    let cli = Cli::parse();
    let config = get_config(cli.config_path.as_deref())?;

    if cli.command == Some(Commands::ConfigCheck) {
        info!("Configuration is valid");
        return Ok(());
    }

    let max_shutdown_delay = Duration::from_secs(cli.max_shutdown_delay.into());

    let runtime = Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()?;
    let res = runtime.block_on(inner_main(config));
    info!(
        "Shutting down runtime with a {} second delay. May leave orphaned tasks.",
        max_shutdown_delay.as_secs(),
    );
    runtime.shutdown_timeout(max_shutdown_delay);
    info!("Bye. :)");
    res
}
