//! HTTP surface of the relay: the publish endpoint, the event stream endpoint, and
//! the server that hosts them.

use axum::Router;
use domain::session::{SessionAuthorizer, TokenSessionAuthorizer};
use log::*;
use service::config::Config;
use sse::{Manager, DEFAULT_TOPIC};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub use self::error::{Error, Result};

mod controller;
mod error;
mod params;
mod router;
mod stream;

/// State shared by every handler. Cloning is cheap: everything but the config is
/// reference counted, and the config is never mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sse_manager: Arc<Manager>,
    pub authorizer: Arc<dyn SessionAuthorizer>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let authorizer = Arc::new(TokenSessionAuthorizer::new(&config, DEFAULT_TOPIC));
        let sse_manager = Arc::new(Manager::new(config.replay_buffer_size));

        Self {
            config,
            sse_manager,
            authorizer,
        }
    }

    /// Replaces the session authorizer, e.g. to plug in a different token policy.
    pub fn with_authorizer(mut self, authorizer: Arc<dyn SessionAuthorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }
}

/// Builds the router for `app_state` without binding a listener.
pub fn app(app_state: AppState) -> Router {
    router::define_routes(app_state)
}

/// Binds the configured interface and port, then serves until the process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_addr = app_state.config.listen_addr();
    let listener = TcpListener::bind(&listen_addr).await?;

    info!("Server started at {listen_addr}");

    serve(listener, app_state).await
}

/// Serves the relay on an already bound listener.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    axum::serve(
        listener,
        app(app_state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
