//! Dashboard configuration.
//!
//! This module defines configuration for the admin page, the viewer
//! endpoints, their anti-forgery tokens and the optional login.

use serde::{Deserialize, Serialize};

/// Capability required to list tables and their row counts.
pub const CAPABILITY_READ: &str = "read";

/// Configuration for the dashboard server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Host to bind the dashboard to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Secret used to sign anti-forgery tokens and sessions.
    /// A random secret is generated at startup when neither this nor
    /// `secret_env` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Environment variable containing the signing secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_env: Option<String>,

    /// How long an anti-forgery token stays valid, in seconds.
    #[serde(default = "default_nonce_lifetime")]
    pub nonce_lifetime_secs: u64,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Authentication configuration for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Users allowed to log in. When empty, every visitor is treated as a
    /// reader and the login page is disabled.
    #[serde(default)]
    pub users: Vec<DashboardUser>,
}

impl AuthConfig {
    /// Whether any login is configured.
    pub fn is_configured(&self) -> bool {
        !self.users.is_empty()
    }

    /// Find a user by name.
    pub fn find_user(&self, username: &str) -> Option<&DashboardUser> {
        self.users.iter().find(|u| u.username == username)
    }
}

/// A dashboard user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardUser {
    /// Username.
    pub username: String,
    /// Password (or environment variable reference).
    #[serde(default)]
    pub password: Option<String>,
    /// Environment variable containing the password.
    #[serde(default)]
    pub password_env: Option<String>,
    /// Capabilities granted to this user.
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

impl DashboardUser {
    /// Get the password, checking password_env first.
    pub fn get_password(&self) -> Option<String> {
        if let Some(env_var) = &self.password_env
            && let Ok(password) = std::env::var(env_var)
        {
            return Some(password);
        }
        self.password.clone()
    }

    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secret: None,
            secret_env: None,
            nonce_lifetime_secs: default_nonce_lifetime(),
            auth: AuthConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the signing secret, checking secret_env first.
    pub fn resolve_secret(&self) -> Option<String> {
        if let Some(env_var) = &self.secret_env
            && let Ok(secret) = std::env::var(env_var)
            && !secret.is_empty()
        {
            return Some(secret);
        }
        self.secret.clone().filter(|s| !s.is_empty())
    }

    /// The `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_nonce_lifetime() -> u64 {
    86_400
}

fn default_capabilities() -> Vec<String> {
    vec![CAPABILITY_READ.to_string()]
}
