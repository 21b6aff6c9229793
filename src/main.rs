use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use clap::Parser;
use rangeserve::config::{self, AppState, Config, Overrides};
use rangeserve::logger;
use rangeserve::server::{self, ServerLoopConfig, Transport};

/// Serve a directory over HTTP with listings and byte-range downloads
#[derive(Debug, Parser)]
#[command(name = "rangeserve", version, about)]
struct Cli {
    /// Configuration file, extension optional
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Directory to serve, overrides server.working_directory
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// HTTP port, overrides server.port
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // First run: write out what the file sources alone produce, so the
    // persisted file never carries command-line overrides
    if !config::config_file_exists(&cli.config) {
        let defaults = Config::load_from(&cli.config, &Overrides::default())?;
        match config::persist_if_missing(&defaults, &cli.config) {
            Ok(Some(path)) => logger::log_config_written(&path),
            Ok(None) => {}
            Err(e) => logger::log_warning(&format!("Could not write default configuration: {e}")),
        }
    }

    let overrides = Overrides {
        working_directory: cli.root,
        port: cli.port,
    };
    let cfg = Config::load_from(&cli.config, &overrides)?;
    logger::init(&cfg)?;
    logger::log_protocol_fallback(cfg.server.protocols);

    let state = Arc::new(AppState::new(cfg)?);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = state.config.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_info("[CONFIG] Using default worker threads (CPU cores)");
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(state))
}

async fn async_main(state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = &state.config;
    let http_addr = cfg.get_socket_addr()?;
    let http_listener = server::bind_listener(http_addr)?;
    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&http_addr, cfg, &state.root);

    let http_task = tokio::spawn(server::start_server_loop(
        http_listener,
        Arc::clone(&state),
        ServerLoopConfig {
            transport: Transport::Plain,
            active_connections: Arc::clone(&active_connections),
            log_prefix: "",
        },
    ));

    // A broken HTTPS setup must not take the HTTP listener down with it
    let https_task = if cfg.https_requested() {
        match server::start_https(&state, &active_connections) {
            Ok(task) => Some(task),
            Err(e) => {
                logger::log_https_disabled(&e);
                None
            }
        }
    } else {
        None
    };

    server::signal::shutdown_signal().await;
    logger::log_shutdown();

    http_task.abort();
    if let Some(task) = https_task {
        task.abort();
    }
    Ok(())
}
