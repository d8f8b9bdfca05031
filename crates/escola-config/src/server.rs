//! HTTP listener and database configuration.
//!
//! - `HOST`: Bind address (default: `0.0.0.0`)
//! - `PORT`: Bind port (default: 3000)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_max_connections: 5,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            database_max_connections: env_or(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
