//! folio-scan: broker folders on disk to holdings. Picks the latest statement
//! per account, extracts text, and runs the per-broker grammars with per-file
//! error isolation.

pub mod config;
pub mod loader;
pub mod scan;
pub mod selector;

pub use config::{BrokerFolder, ScanConfig};
pub use loader::{DefaultExtractor, FileKind, LoadError, PlainTextExtractor, TextExtractor, load_document, load_file};
pub use scan::{FileOutcome, ScanReport, scan, scan_folder};
pub use selector::{AccountFileKey, Candidate, infer_key, select_latest};
