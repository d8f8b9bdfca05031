//! Cross-origin access for the report download and dashboard endpoints.
//!
//! - `ALLOWED_ORIGINS`: Comma-separated origin list
//!   (default: `http://localhost:3000,http://localhost:5173`)

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::parse(DEFAULT_ALLOWED_ORIGINS)
    }
}

impl CorsConfig {
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("ALLOWED_ORIGINS")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    fn parse(value: &str) -> Self {
        let allowed_origins = value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_empty() {
        let config = CorsConfig::parse(" https://a.example , ,https://b.example");
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_default_origins() {
        assert_eq!(CorsConfig::default().allowed_origins.len(), 2);
    }
}
