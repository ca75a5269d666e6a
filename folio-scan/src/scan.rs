//! The multi-broker scan loop.
//!
//! A file that fails to load or parse is logged and recorded in the report;
//! it never stops the remaining files or folders.

use anyhow::Result;
use folio_core::{Holding, Summary, summarize};
use folio_ingest::{Institution, ParseOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{BrokerFolder, ScanConfig};
use crate::loader::{TextExtractor, load_file};
use crate::selector::{count_files, select_in_folder};

/// What happened to one selected file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub institution: Institution,
    pub file: String,
    pub positions: usize,
    /// Set when the file could not be loaded or parsed
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of scanning one or more broker folders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Folders in configuration order, files in selector order
    pub holdings: Vec<Holding>,
    pub files: Vec<FileOutcome>,
    /// Non-hidden files present in the scanned folders, loaded or not
    pub file_count: usize,
}

impl ScanReport {
    /// Append another report, keeping this one's entries first
    pub fn merge(&mut self, other: ScanReport) {
        self.holdings.extend(other.holdings);
        self.files.extend(other.files);
        self.file_count += other.file_count;
    }

    pub fn errors(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.is_error())
    }

    pub fn summary(&self) -> Summary {
        summarize(self.holdings.clone())
    }
}

/// Scan one broker folder. A folder that does not exist yields an empty
/// report; one that exists but cannot be listed is an error.
pub fn scan_folder(
    folder: &BrokerFolder,
    opts: &ParseOptions,
    extractor: &dyn TextExtractor,
) -> Result<ScanReport> {
    let mut report = ScanReport::default();
    if !folder.path.is_dir() {
        debug!(folder = %folder.path.display(), "broker folder missing, skipping");
        return Ok(report);
    }

    report.file_count = count_files(&folder.path)?;
    for name in select_in_folder(&folder.path)? {
        let path = folder.path.join(&name);
        info!("Loading [{}] {}", folder.institution, name);
        match load_file(folder.institution, &path, opts, extractor) {
            Ok(holdings) => {
                info!(positions = holdings.len(), "  -> {} positions", holdings.len());
                report.files.push(FileOutcome {
                    institution: folder.institution,
                    file: name,
                    positions: holdings.len(),
                    error: None,
                });
                report.holdings.extend(holdings);
            }
            Err(e) => {
                warn!(file = %path.display(), "failed to load statement: {e:#}");
                report.files.push(FileOutcome {
                    institution: folder.institution,
                    file: name,
                    positions: 0,
                    error: Some(format!("{e:#}")),
                });
            }
        }
    }

    Ok(report)
}

/// Scan every configured folder in order
pub fn scan(config: &ScanConfig, extractor: &dyn TextExtractor) -> Result<ScanReport> {
    let mut report = ScanReport::default();
    for folder in &config.folders {
        let opts = config.parse_options(folder.institution);
        report.merge(scan_folder(folder, &opts, extractor)?);
    }
    info!(
        files = report.files.len(),
        holdings = report.holdings.len(),
        errors = report.errors().count(),
        "scan complete"
    );
    Ok(report)
}
