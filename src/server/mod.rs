// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

pub mod api;
pub mod pdfresponse;


use std::{sync::Arc, time::Duration};

use anyhow::Result;
use poem::{
    listener::TcpListener,
    middleware::{NormalizePath, Tracing, TrailingSlash},
    Endpoint, EndpointExt, Route, Server,
};
use poem_openapi::OpenApiService;
use tracing::{error, info};

use crate::renderer::Pipeline;

pub use api::Api;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub fn app(pipeline: Arc<Pipeline>) -> impl Endpoint {
    let api_service =
        OpenApiService::new(Api::new(pipeline), "Pagepress", env!("CARGO_PKG_VERSION"));
    let docs = api_service.swagger_ui();

    Route::new()
        .nest("/docs", docs)
        .nest("/", api_service)
        .with(Tracing)
        .with(NormalizePath::new(TrailingSlash::Trim))
}

pub async fn start(listen: &str, pipeline: Pipeline) -> Result<()> {
    let app = app(Arc::new(pipeline));

    info!("Listening on {}", listen);
    let listener = TcpListener::bind(listen);
    Server::new(listener)
        .run_with_graceful_shutdown(app, shutdown_signal(), Some(SHUTDOWN_GRACE))
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received, stopping server...");
}
