use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use lovecal::{
    App, Cli, Config, LocalStorage, OfflineStore, PostgrestConfig, PostgrestStore,
    RemoteEventStore, Result,
};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

/// Remote store from the configuration; offline when no URL is set.
fn remote_store(config: &Config) -> Result<Arc<dyn RemoteEventStore>> {
    match &config.remote_url {
        Some(url) => {
            info!("Syncing with {}", url);
            let store = PostgrestStore::new(PostgrestConfig {
                base_url: url.clone(),
                api_key: config.remote_api_key.clone().unwrap_or_default(),
                table: config.remote_table.clone(),
                timeout: config.remote_timeout(),
            })?;
            Ok(Arc::new(store))
        }
        None => {
            info!("No remote configured; working offline");
            Ok(Arc::new(OfflineStore))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let storage = LocalStorage::new(config.data_dir.clone());
    let remote = remote_store(&config)?;
    let app = App::new(config, storage, remote, cli.verbose);
    app.run(cli.command).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");
    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("{} {}", console::style("error:").red().bold(), e);
        std::process::exit(1);
    }
    info!("Application shutting down");
}
