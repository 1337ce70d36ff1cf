//! Web server for Sharebox.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::{ServerConfig, WebConfig};
use crate::{Result, ShareError};

use super::handlers::AppState;
use super::router::{create_health_router, create_router, create_static_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(server: &ServerConfig, web: &WebConfig, app_state: AppState) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| {
                ShareError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    server.host, server.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            web_config: web.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(self) -> Router {
        let mut router = create_router(self.app_state, &self.web_config.cors_origins)
            .merge(create_health_router());

        if self.web_config.serve_static {
            if let Some(static_router) = create_static_router(&self.web_config.static_path) {
                router = router.merge(static_router);
            }
        }

        router.layer(CompressionLayer::new())
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.build_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.build_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
