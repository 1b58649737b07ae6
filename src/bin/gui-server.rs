use std::{process, sync::Arc};

use clap::Parser;
use cluster_gui::{
    backend::{make_fixture_backend, make_remote_backend, BackendGateway},
    config::{GuiArgs, GuiConfig},
    logging::init_logging,
    web::{build_router, AppState},
};
use tracing::{error, info};

fn make_backend(config: &GuiConfig) -> Result<Box<dyn BackendGateway + Send + Sync>, String> {
    match &config.fixtures {
        Some(path) => {
            make_fixture_backend(path).map_err(|err| format!("Fixtures {}: {}", path, err))
        }
        None => make_remote_backend(
            &config.backend_protocol,
            &config.backend_host,
            config.backend_port,
        )
        .map_err(|err| err.to_string()),
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let config = match GuiArgs::parse().resolve() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };
    let addr = match config.listen_socket_addr() {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };
    let backend = match make_backend(&config) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    info!(%addr, backend = backend.kind(), "starting gui server");
    let app = build_router(Arc::new(AppState::new(backend, config)));

    if let Err(err) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        error!(%err, "server stopped");
        process::exit(1);
    }
}
