//! Report generation configuration.
//!
//! # Configuration
//!
//! - `REPORT_ORGANIZATION`: Organization name printed in titles and page footers
//!   (default: `Escola Técnica`)
//! - `REPORT_FETCH_TIMEOUT_SECS`: Deadline for the entity fetch step (default: 30)
//! - `REPORT_BRAND_COLOR`: Workbook header background as hex RGB (default: `1F4E78`)

use std::time::Duration;

use crate::env_or;

pub const DEFAULT_ORGANIZATION: &str = "Escola Técnica";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BRAND_COLOR: u32 = 0x1F4E78;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportConfig {
    /// Printed as `<org> - Sistema de Gestão` in every page footer.
    pub organization: String,

    /// Deadline applied to each store fetch; the fetch future is dropped when it elapses.
    pub fetch_timeout: Duration,

    /// Background color of workbook header rows.
    pub brand_color: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            brand_color: DEFAULT_BRAND_COLOR,
        }
    }
}

impl ReportConfig {
    /// Creates a new `ReportConfig` from environment variables.
    ///
    /// Falls back to default values if variables are not set or cannot be parsed.
    #[must_use]
    pub fn from_env() -> Self {
        let organization = std::env::var("REPORT_ORGANIZATION")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string());

        let brand_color = std::env::var("REPORT_BRAND_COLOR")
            .ok()
            .and_then(|v| parse_hex_color(&v))
            .unwrap_or(DEFAULT_BRAND_COLOR);

        Self {
            organization,
            fetch_timeout: Duration::from_secs(env_or(
                "REPORT_FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )),
            brand_color,
        }
    }

    /// Footer text stamped on page `page` of `total`.
    pub fn footer(&self, page: usize, total: usize) -> String {
        format!(
            "Página {} de {} | {} - Sistema de Gestão",
            page, total, self.organization
        )
    }
}

/// Parses `1F4E78`, `#1F4E78` or `0x1F4E78`.
pub fn parse_hex_color(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);

    if hex.len() != 6 {
        return None;
    }

    u32::from_str_radix(hex, 16).ok()
}
