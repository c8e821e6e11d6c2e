use anyhow::Result;
use clap::Parser;
use token_machine::context::AppContext;
use token_machine::server;
use token_machine::utils::config_loader;
use token_machine::utils::constants::DEFAULT_CONFIG_PATH;
use token_machine::utils::logging;
use token_machine::utils::logging::LogLevel;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);
    info!("GIT Version: {} @ {}", env_or("GIT_BRANCH", "dev"), env_or("GIT_HASH", "dev"));
    info!("loaded config from {}", &args.config);

    // -------------------------------
    // 2. Start token store, load tokens, start refresher
    // -------------------------------

    let mut ctx = AppContext::new(&args.config);
    ctx.bootstrap(&service_config).await?;

    // -------------------------------
    // 3. Start http server
    // -------------------------------

    let settings = service_config.settings.clone();
    let store = ctx.store.clone();
    let shutdown = ctx.shutdown_signal();
    let mut http_server = tokio::spawn(async move { server::server::start(&settings, store, shutdown).await });

    // -------------------------------
    // 4. Wait for termination, tear down
    // -------------------------------

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let server_result = tokio::select! {
        _ = sigint.recv() => { info!("received SIGINT, shutting down"); None }
        _ = sigterm.recv() => { info!("received SIGTERM, shutting down"); None }
        result = &mut http_server => Some(result),
    };

    if let Err(e) = ctx.shutdown().await {
        error!("unable to stop token store: {}", e);
    }
    let server_result = match server_result {
        Some(result) => result,
        None => http_server.await,
    };
    match server_result {
        Ok(Err(e)) => error!("HTTP server failed: {}", e),
        Err(e) => error!("HTTP server task failed: {}", e),
        Ok(Ok(())) => {}
    }

    info!("exiting cleanly");
    Ok(())
}
