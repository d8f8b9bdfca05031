//! # Escola Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`cors`]: Allowed CORS origins
//! - [`report`]: Report rendering and fetch configuration
//! - [`server`]: HTTP listener and database pool configuration
//!
//! # Example
//!
//! ```ignore
//! use escola_config::{ReportConfig, ServerConfig};
//!
//! let report_config = ReportConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod report;
pub mod server;

pub use cors::CorsConfig;
pub use report::ReportConfig;
pub use server::ServerConfig;

/// Reads and parses an environment variable, falling back to `default` when it is
/// unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
