//! Dashboard server implementation.

use tokio::net::TcpListener;

use crate::error::DashboardError;
use crate::routes;
use crate::state::AppState;

/// The dashboard server.
pub struct DashboardServer {
    state: AppState,
}

impl DashboardServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// The `host:port` pair the server binds.
    pub fn bind_address(&self) -> String {
        self.state.config().dashboard.bind_address()
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<(), DashboardError> {
        let addr = self.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DashboardError::StartupFailed(format!("Failed to bind to {}: {}", addr, e)))?;

        tracing::info!(
            address = %addr,
            prefix = %self.state.viewer().prefix(),
            "Starting rowlens dashboard"
        );

        let app = routes::create_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DashboardError::StartupFailed(e.to_string()))?;

        tracing::info!("Dashboard stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
