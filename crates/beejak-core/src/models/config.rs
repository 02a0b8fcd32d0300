use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for beejak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeejakConfig {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// The issuing business printed on every invoice
    #[serde(default)]
    pub business: BusinessConfig,
    /// Invoice drafting defaults
    #[serde(default)]
    pub invoice: InvoiceConfig,
}

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the beejak backend
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Details of the business issuing invoices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    pub name: String,
    /// 15-character GST identification number
    pub gstin: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Defaults applied when drafting a new invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    /// Prefix for generated invoice numbers
    pub number_prefix: String,
    /// GST percentage preselected for new line items
    pub default_gst_rate: Decimal,
    /// Days until payment is due
    pub due_days: i64,
}

impl Default for BeejakConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            business: BusinessConfig::default(),
            invoice: InvoiceConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            number_prefix: "INV-".to_string(),
            default_gst_rate: Decimal::from(18),
            due_days: 15,
        }
    }
}

impl BeejakConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BeejakConfig = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = BeejakConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.invoice.number_prefix, "INV-");
        assert_eq!(config.invoice.default_gst_rate, Decimal::from(18));
        assert_eq!(config.invoice.due_days, 15);
        assert!(config.business.name.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BeejakConfig::default();
        config.business.name = "Beejak Traders".to_string();
        config.business.gstin = "27AAAPA1234A1Z5".to_string();
        config.save(&path).unwrap();

        let loaded = BeejakConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"business": {"name": "Beejak Traders"}}"#).unwrap();

        let config = BeejakConfig::from_file(&path).unwrap();
        assert_eq!(config.business.name, "Beejak Traders");
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.invoice, InvoiceConfig::default());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = BeejakConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
