//! Provider alias dictionary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReciboError, Result};

/// One alias group: any of `names` maps to `normalized_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMapping {
    /// Alias strings as they may appear in OCR text.
    #[serde(default)]
    pub names: Vec<String>,

    /// Canonical name used in output file names.
    pub normalized_name: String,
}

/// Ordered list of provider mappings. Matching scans in listed order and the
/// first alias hit wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderDictionary {
    pub providers: Vec<ProviderMapping>,
}

impl ProviderDictionary {
    /// Load the dictionary from a JSON file. A missing file yields an empty
    /// dictionary; the normalizer then falls back to cleanup-only behavior.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("provider dictionary not found at {}, using empty dictionary", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ReciboError::Config(format!("invalid provider dictionary {}: {}", path.display(), e)))
    }
}
