use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Brokerage whose statements live in one configured folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Institution {
    Fidelity,
    Schwab,
    MorganStanley,
}

impl Institution {
    pub fn label(&self) -> &'static str {
        match self {
            Institution::Fidelity => "Fidelity",
            Institution::Schwab => "Schwab",
            Institution::MorganStanley => "Morgan Stanley",
        }
    }

    /// Conventional folder name under a data directory
    pub fn folder_name(&self) -> &'static str {
        match self {
            Institution::Fidelity => "fidelity",
            Institution::Schwab => "schwab",
            Institution::MorganStanley => "morgan_stanley",
        }
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Statement grammar; each variant maps to one fixed matcher pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementFormat {
    Schwab,
    Fidelity,
    FidelityNetBenefits,
    MorganStanley,
    GenericCsv,
}

impl StatementFormat {
    /// Pick the grammar for a file found in an institution's folder
    pub fn resolve(institution: Institution, path: &Path) -> Self {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv {
            return StatementFormat::GenericCsv;
        }

        match institution {
            Institution::Schwab => StatementFormat::Schwab,
            Institution::MorganStanley => StatementFormat::MorganStanley,
            Institution::Fidelity => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if name.contains("netbenefits") {
                    StatementFormat::FidelityNetBenefits
                } else {
                    StatementFormat::Fidelity
                }
            }
        }
    }
}

/// Raw content of one statement
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentBody {
    /// PDF-derived text, one entry per page
    Pages(Vec<String>),
    /// CSV export text
    Csv(String),
}

/// One statement, alive only for the duration of a parse call
#[derive(Debug, Clone, PartialEq)]
pub struct StatementDocument {
    pub format: StatementFormat,
    pub path: PathBuf,
    pub body: DocumentBody,
}

impl StatementDocument {
    pub fn from_pages(format: StatementFormat, path: impl Into<PathBuf>, pages: Vec<String>) -> Self {
        Self {
            format,
            path: path.into(),
            body: DocumentBody::Pages(pages),
        }
    }

    pub fn from_csv(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            format: StatementFormat::GenericCsv,
            path: path.into(),
            body: DocumentBody::Csv(text.into()),
        }
    }

    /// Text of one page (0-based); empty when absent
    pub fn page(&self, index: usize) -> &str {
        match &self.body {
            DocumentBody::Pages(pages) => pages.get(index).map(String::as_str).unwrap_or(""),
            DocumentBody::Csv(text) if index == 0 => text,
            DocumentBody::Csv(_) => "",
        }
    }

    pub fn page_count(&self) -> usize {
        match &self.body {
            DocumentBody::Pages(pages) => pages.len(),
            DocumentBody::Csv(_) => 1,
        }
    }

    /// All pages joined with newlines
    pub fn full_text(&self) -> String {
        match &self.body {
            DocumentBody::Pages(pages) => pages.join("\n"),
            DocumentBody::Csv(text) => text.clone(),
        }
    }

    /// Every line of every page, trimmed, in document order
    pub fn lines(&self) -> Vec<String> {
        match &self.body {
            DocumentBody::Pages(pages) => pages
                .iter()
                .flat_map(|p| p.lines())
                .map(|l| l.trim().to_string())
                .collect(),
            DocumentBody::Csv(text) => text.lines().map(|l| l.trim().to_string()).collect(),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Static, per-scan inputs to a parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Base account label, usually the institution label
    pub account_label: String,
    /// Ticker used by the stock-plan matcher when the issuer is not recognised
    pub espp_fallback_symbol: String,
}

impl ParseOptions {
    pub fn for_institution(institution: Institution) -> Self {
        Self {
            account_label: institution.label().to_string(),
            espp_fallback_symbol: DEFAULT_ESPP_SYMBOL.to_string(),
        }
    }
}

pub const DEFAULT_ESPP_SYMBOL: &str = "IBM";
