use std::sync::Arc;

use hello_backend::config::{self, Config};
use hello_backend::error::StartupError;
use hello_backend::{logger, server, App, ServerSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path).map_err(StartupError::from)?;
    logger::init(&cfg.logging).map_err(StartupError::Logger)?;

    // Worker threads default to the CPU count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr).inspect_err(|e| {
        logger::log_error(&e.to_string());
    })?;

    let app = Arc::new(App::from_config(&cfg));
    let settings = Arc::new(ServerSettings::from_config(&cfg));

    logger::log_server_start(addr.port());
    logger::log_debug(&format!("Serving with {}", app.describe()));

    server::serve(listener, app, settings).await;
    Ok(())
}
