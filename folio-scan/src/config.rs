//! Scan configuration: which folders hold which broker's statements.

use anyhow::{Context, Result};
use folio_ingest::{DEFAULT_ESPP_SYMBOL, Institution, ParseOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Institutions in the order their folders are scanned by default
pub const DEFAULT_INSTITUTIONS: [Institution; 3] = [
    Institution::Fidelity,
    Institution::Schwab,
    Institution::MorganStanley,
];

/// One broker's statement folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerFolder {
    pub institution: Institution,
    pub path: PathBuf,
}

impl BrokerFolder {
    pub fn new(institution: Institution, path: impl Into<PathBuf>) -> Self {
        Self {
            institution,
            path: path.into(),
        }
    }
}

/// Everything one scan needs; passed in explicitly, never read from globals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Ticker for stock-plan statements whose issuer is not recognised
    #[serde(default = "default_espp_symbol")]
    pub espp_fallback_symbol: String,
    /// Scanned in this order; output preserves it
    pub folders: Vec<BrokerFolder>,
}

fn default_espp_symbol() -> String {
    DEFAULT_ESPP_SYMBOL.to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

impl ScanConfig {
    /// `<dir>/fidelity`, `<dir>/schwab`, `<dir>/morgan_stanley`
    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            espp_fallback_symbol: default_espp_symbol(),
            folders: DEFAULT_INSTITUTIONS
                .iter()
                .map(|&inst| BrokerFolder::new(inst, dir.join(inst.folder_name())))
                .collect(),
        }
    }

    /// Per-file parse inputs for one institution
    pub fn parse_options(&self, institution: Institution) -> ParseOptions {
        ParseOptions {
            espp_fallback_symbol: self.espp_fallback_symbol.clone(),
            ..ParseOptions::for_institution(institution)
        }
    }

    /// Create any configured folder that does not exist yet
    pub fn ensure_folders(&self) -> Result<()> {
        for folder in &self.folders {
            std::fs::create_dir_all(&folder.path)
                .with_context(|| format!("creating {}", folder.path.display()))?;
        }
        Ok(())
    }
}
