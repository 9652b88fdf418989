//! SEO Refinery CLI entry point.

use clap::Parser;
use tokio_util::sync::CancellationToken;

use seo_refinery::cli::{commands, handle_error, load_config, Cli, Commands};
use seo_refinery::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };
    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling runs");
            on_signal.cancel();
        }
    });

    let result = match cli.command {
        Commands::Optimize(args) => {
            commands::optimize::execute(args, &config, cancel, cli.json).await
        }
        Commands::Score(args) => commands::score::execute(args, &config, cli.json).await,
        Commands::History(args) => commands::history::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
