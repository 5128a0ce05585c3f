//! Dashboard application state.

use rowlens_core::RowlensConfig;
use rowlens_runtime::TableViewer;
use std::sync::Arc;

use crate::nonce::NonceIssuer;

/// Shared application state for the dashboard.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RowlensConfig,
    viewer: Arc<TableViewer>,
    nonces: NonceIssuer,
}

impl AppState {
    /// Build the state. Without a configured secret, tokens and sessions are
    /// keyed by a random secret and do not survive a restart.
    pub fn new(config: RowlensConfig, viewer: Arc<TableViewer>) -> Self {
        let lifetime = config.dashboard.nonce_lifetime_secs;
        let nonces = match config.dashboard.resolve_secret() {
            Some(secret) => NonceIssuer::new(secret.into_bytes(), lifetime),
            None => {
                tracing::warn!("No dashboard secret configured; tokens will not survive a restart");
                NonceIssuer::random(lifetime)
            }
        };
        Self::with_nonces(config, viewer, nonces)
    }

    pub fn with_nonces(config: RowlensConfig, viewer: Arc<TableViewer>, nonces: NonceIssuer) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                viewer,
                nonces,
            }),
        }
    }

    pub fn config(&self) -> &RowlensConfig {
        &self.inner.config
    }

    pub fn viewer(&self) -> &TableViewer {
        &self.inner.viewer
    }

    pub fn nonces(&self) -> &NonceIssuer {
        &self.inner.nonces
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    test_state_with(RowlensConfig::default())
}

#[cfg(test)]
pub(crate) fn test_state_with(config: RowlensConfig) -> AppState {
    let source = rowlens_runtime::demo::sample_source(&config.viewer.table_prefix);
    let viewer = TableViewer::new(Arc::new(source), &config).expect("valid test config");
    AppState::with_nonces(
        config,
        Arc::new(viewer),
        NonceIssuer::new(b"test-secret".to_vec(), 86_400),
    )
}
