//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DdtxError, Result};

/// Main configuration for the ddtx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DdtxConfig {
    /// PDF reading configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// PDF reading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Read every page, or only the first.
    pub all_pages: bool,

    /// Below this many characters the reader result counts as "no text".
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            all_pages: true,
            min_text_length: 1,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Drop extracted tax ids that fail the checksum.
    pub validate_tax_ids: bool,

    /// Lines scanned after a single-line layout match for address and tax id.
    pub layout_window: usize,

    /// Suppliers recognised by a marker in the text.
    pub known_suppliers: Vec<SupplierProfile>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            validate_tax_ids: false,
            layout_window: 10,
            known_suppliers: vec![SupplierProfile::alfieri()],
        }
    }
}

impl ExtractionConfig {
    /// Tax ids of every known supplier.
    pub fn supplier_tax_ids(&self) -> Vec<String> {
        self.known_suppliers
            .iter()
            .filter(|p| !p.tax_id.is_empty())
            .map(|p| p.tax_id.clone())
            .collect()
    }
}

/// Fixed supplier data applied when `marker` occurs in the document text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierProfile {
    /// Lower-case text that identifies the supplier.
    pub marker: String,
    pub name: String,
    pub tax_id: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

impl SupplierProfile {
    fn alfieri() -> Self {
        Self {
            marker: "alfieri".to_string(),
            name: "ALFIERI SPECIALITA' ALIMENTARI S.P.A.".to_string(),
            tax_id: "03247720042".to_string(),
            address: "C.so G. Marconi 10/E".to_string(),
            postal_code: "12050".to_string(),
            city: "MAGLIANO ALFIERI".to_string(),
            province: "CN".to_string(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty_json: true }
    }
}

impl DdtxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| DdtxError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| DdtxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DdtxConfig::default();
        assert_eq!(config.extraction.layout_window, 10);
        assert_eq!(config.extraction.supplier_tax_ids(), vec!["03247720042"]);
        assert!(config.pdf.all_pages);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: DdtxConfig =
            serde_json::from_str(r#"{"extraction": {"validate_tax_ids": true}}"#).unwrap();
        assert!(config.extraction.validate_tax_ids);
        assert_eq!(config.extraction.layout_window, 10);
        assert!(config.output.pretty_json);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DdtxConfig::default();
        config.extraction.known_suppliers.clear();
        config.save(&path).unwrap();

        let loaded = DdtxConfig::from_file(&path).unwrap();
        assert!(loaded.extraction.known_suppliers.is_empty());
    }
}
