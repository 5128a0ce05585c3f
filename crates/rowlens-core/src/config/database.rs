//! Database connection configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the database holding the viewed tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Hostname of the Postgres server.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the Postgres server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name to connect to.
    #[serde(default = "default_database")]
    pub database: String,

    /// Username for the connection.
    #[serde(default = "default_username")]
    pub username: String,

    /// Password for the connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable containing the full DATABASE_URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_env: Option<String>,

    /// Schema whose tables are listed.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Connection pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            username: default_username(),
            password: None,
            credentials_env: None,
            schema: default_schema(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// Build a PostgreSQL connection string from this configuration.
    pub fn connection_string(&self) -> String {
        if let Some(env_var) = &self.credentials_env
            && let Ok(url) = std::env::var(env_var)
        {
            return url;
        }

        match &self.password {
            Some(password) => format!(
                "postgresql://{}:{}@{}:{}/{}",
                self.username, password, self.host, self.port, self.database
            ),
            None => format!(
                "postgresql://{}@{}:{}/{}",
                self.username, self.host, self.port, self.database
            ),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_username() -> String {
    "postgres".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_max_connections() -> u32 {
    5
}
