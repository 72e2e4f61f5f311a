//! Service configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the order processing service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL used when building download links
    pub public_base_url: String,

    /// Directory reports are written to
    pub reports_dir: PathBuf,

    /// How long download links stay valid
    pub download_ttl_hours: i64,

    pub currency: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8080".to_string(),
            reports_dir: PathBuf::from("reports"),
            download_ttl_hours: 72,
            currency: shield_core::CURRENCY.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }

    pub fn with_reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = dir.into();
        self
    }

    pub fn with_download_ttl_hours(mut self, hours: i64) -> Self {
        self.download_ttl_hours = hours;
        self
    }

    /// Download URL for one report format of an order
    pub fn download_url(&self, order_id: &str, format: &str) -> String {
        format!(
            "{}/api/reports/{}/download/{}",
            self.public_base_url.trim_end_matches('/'),
            order_id,
            format
        )
    }
}
