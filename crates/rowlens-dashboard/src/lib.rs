//! # rowlens-dashboard
//!
//! Web surface for the rowlens table viewer.
//!
//! This crate provides:
//! - the table data endpoint (`POST /api/table-data`) and the row count
//!   endpoint (`POST /api/table-counts`)
//! - server-rendered viewer fragments driven by the viewer state machine
//! - the admin page listing every allow-listed table with its embed snippet
//! - expansion of `[rowlens_table]` embeds inside arbitrary HTML content
//! - keyed anti-forgery tokens and optional form login
//!
//! ## Tech Stack
//!
//! - Axum for HTTP, `tower-http` tracing
//! - Static JS/CSS bundled via `rust-embed`
//! - Tailwind CSS and Alpine.js on the admin page, a small vanilla
//!   script for the viewer

pub mod api_types;
pub mod assets;
pub mod auth;
pub mod embed;
pub mod error;
pub mod handlers;
pub mod highlight;
pub mod nonce;
pub mod pages;
pub mod render;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

pub use error::DashboardError;
pub use routes::create_router;
pub use server::DashboardServer;
pub use state::AppState;
