//! `rowlens serve`: start the dashboard and viewer endpoints.

use anyhow::{Context, Result};
use std::path::Path;

use rowlens_dashboard::{AppState, DashboardServer};

pub async fn run(
    config_path: &Path,
    demo: bool,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(host) = host {
        config.dashboard.host = host;
    }
    if let Some(port) = port {
        config.dashboard.port = port;
    }

    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("  ✗ {}", problem);
        }
        anyhow::bail!(
            "Configuration has {} error(s). Run `rowlens check` for details.",
            problems.len()
        );
    }

    let viewer = super::open_viewer(&config, demo).await?;
    if !config.dashboard.auth.is_configured() {
        tracing::warn!("No dashboard users configured; every visitor can list tables and counts");
    }

    let state = AppState::new(config, viewer);
    let server = DashboardServer::new(state);
    println!("rowlens dashboard listening on http://{}", server.bind_address());
    server.run().await.context("Dashboard server failed")?;

    Ok(())
}
