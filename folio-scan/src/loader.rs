//! Turning one file on disk into a `StatementDocument`.
//!
//! CSV exports are read as text. Statements arrive either as PDFs, read page
//! by page, or as the text a PDF-to-text tool produced from them, pages
//! separated by form feeds.

use anyhow::{Context, Result};
use folio_core::Holding;
use folio_ingest::{Institution, ParseOptions, StatementDocument, StatementFormat, parse_document};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Page separator in PDF-derived text
pub const PAGE_BREAK: char = '\x0c';

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported statement type: {0}")]
    UnsupportedExtension(PathBuf),
    #[error("PDF support is not compiled in; convert {0} to text first")]
    PdfSupportDisabled(PathBuf),
    #[error("could not extract text from {path}: {message}")]
    Extraction { path: PathBuf, message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a statement file is read, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Pdf,
    Text,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(FileKind::Csv),
            "pdf" => Some(FileKind::Pdf),
            "txt" => Some(FileKind::Text),
            _ => None,
        }
    }
}

/// Source of page text for PDF-derived statements
pub trait TextExtractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>>;
}

/// Split extracted text into pages. A trailing separator does not start a page.
pub fn split_pages(text: &str) -> Vec<String> {
    let text = text.strip_suffix(PAGE_BREAK).unwrap_or(text);
    text.split(PAGE_BREAK).map(str::to_string).collect()
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(LoadError::from)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads `.txt` statements produced by an external PDF-to-text step
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        Ok(split_pages(&read_lossy(path)?))
    }
}

/// Extracts `.pdf` text in-process
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(path)
            .map_err(LoadError::from)
            .with_context(|| format!("reading {}", path.display()))?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| LoadError::Extraction {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(pages)
    }
}

/// `.txt` as plain text; `.pdf` through the PDF extractor when it is compiled in
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

impl TextExtractor for DefaultExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        match FileKind::from_path(path) {
            Some(FileKind::Text) => PlainTextExtractor.extract_pages(path),
            #[cfg(feature = "pdf")]
            Some(FileKind::Pdf) => PdfExtractor.extract_pages(path),
            #[cfg(not(feature = "pdf"))]
            Some(FileKind::Pdf) => Err(LoadError::PdfSupportDisabled(path.to_path_buf()).into()),
            _ => Err(LoadError::UnsupportedExtension(path.to_path_buf()).into()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "extractor panicked".to_string()
    }
}

/// Run an extractor, turning a panic inside it into an extraction error.
/// PDF decoding panics on some malformed files.
fn extract_guarded(extractor: &dyn TextExtractor, path: &Path) -> Result<Vec<String>> {
    match catch_unwind(AssertUnwindSafe(|| extractor.extract_pages(path))) {
        Ok(pages) => pages,
        Err(payload) => Err(LoadError::Extraction {
            path: path.to_path_buf(),
            message: panic_message(payload.as_ref()),
        }
        .into()),
    }
}

/// Read a statement from disk and tag it with its grammar
pub fn load_document(
    institution: Institution,
    path: &Path,
    extractor: &dyn TextExtractor,
) -> Result<StatementDocument> {
    let kind = FileKind::from_path(path).ok_or_else(|| LoadError::UnsupportedExtension(path.to_path_buf()))?;
    let format = StatementFormat::resolve(institution, path);

    match kind {
        FileKind::Csv => {
            let text = read_lossy(path)?;
            let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
            Ok(StatementDocument::from_csv(path, text))
        }
        FileKind::Pdf | FileKind::Text => {
            let pages = extract_guarded(extractor, path)
                .with_context(|| format!("extracting {}", path.display()))?;
            Ok(StatementDocument::from_pages(format, path, pages))
        }
    }
}

/// Load and parse one statement file
pub fn load_file(
    institution: Institution,
    path: &Path,
    opts: &ParseOptions,
    extractor: &dyn TextExtractor,
) -> Result<Vec<Holding>> {
    let doc = load_document(institution, path, extractor)?;
    parse_document(&doc, opts).with_context(|| format!("parsing {}", path.display()))
}
