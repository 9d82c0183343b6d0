//! Web server for the FreshKart auth API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::auth::AuthService;
use crate::config::Config;
use crate::{FreshkartError, Result};

use super::handlers::AppState;
use super::middleware::{allowed_origins, CaptchaVerifier, RateLimitState, TrustedProxies};
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    rate_limits: Arc<RateLimitState>,
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(
        config: &Config,
        auth: Arc<AuthService>,
        captcha: Arc<dyn CaptchaVerifier>,
    ) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| FreshkartError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(auth, captcha)),
            rate_limits: Arc::new(
                RateLimitState::new(config.rate_limit.clone()).with_trusted_proxies(
                    TrustedProxies::new(config.server.trusted_proxies.iter().copied()),
                ),
            ),
            cors_origins: allowed_origins(&config.server.cors_origins, &config.auth.frontend_url),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The full application router.
    pub fn router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            self.rate_limits.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router())
    }

    async fn bind(self) -> std::io::Result<(TcpListener, Router)> {
        let router = self.router();
        self.rate_limits.clone().start_cleanup_task();

        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);
        Ok((listener, router))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            let service = router.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, service).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
