//! Statement selector: brokers keep every quarter's statement in one folder,
//! so only the most recent file per account is loaded. Loading all of them
//! would count the same positions several times.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Extensions a statement may have (compared case-insensitively)
pub const STATEMENT_EXTENSIONS: &[&str] = &["csv", "pdf", "txt"];

/// Date for files whose name carries none; sorts before every real date
pub const UNDATED: &str = "0000-00-00";
/// Account key shared by every `MM_DD_YYYY` statement
pub const STOCK_PLAN_ACCOUNT: &str = "ms";

// "Brokerage Statement_2025-12-31_582.PDF"
static ISO_DATE_ACCOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{4}-\d{2}-\d{2})_(\w+)\.").unwrap());
// "Quarterly Statement 12_31_2025.pdf"
static UNDERSCORE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})_(\d{2})_(\d{4})\.").unwrap());
// "Statement12312025.pdf", "Statement12312025-2.pdf"
static COMPACT_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{8})").unwrap());
static VARIANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"-(\d+)\.").unwrap());

/// What a file name says about its statement. `date` is zero-padded ISO,
/// so string order is date order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AccountFileKey {
    pub date: String,
    pub account: String,
}

impl AccountFileKey {
    fn new(date: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            account: account.into(),
        }
    }

    /// The date as a calendar date; None for [`UNDATED`] or impossible dates
    pub fn statement_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Infer `(date, account)` from a file name, first matching rule wins.
pub fn infer_key(file_name: &str) -> AccountFileKey {
    if let Some(c) = ISO_DATE_ACCOUNT.captures(file_name) {
        return AccountFileKey::new(&c[1], &c[2]);
    }

    if let Some(c) = UNDERSCORE_DATE.captures(file_name) {
        return AccountFileKey::new(format!("{}-{}-{}", &c[3], &c[1], &c[2]), STOCK_PLAN_ACCOUNT);
    }

    // Each variant is its own account so same-day statements are all kept
    if let Some(c) = COMPACT_DATE.captures(file_name) {
        let d = &c[1];
        let variant = VARIANT.captures(file_name).map(|v| v[1].to_string());
        let account = format!("fid_{}", variant.as_deref().unwrap_or("0"));
        return AccountFileKey::new(format!("{}-{}-{}", &d[4..8], &d[0..2], &d[2..4]), account);
    }

    AccountFileKey::new(UNDATED, file_name)
}

/// One file's selector verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub file: String,
    pub key: AccountFileKey,
    pub kept: bool,
}

/// Every file with its inferred key and whether it is the latest for its account.
///
/// Files are visited in name order and a later file replaces the current
/// best only with a strictly greater date, so ties go to the first name.
pub fn evaluate<S: AsRef<str>>(files: &[S]) -> Vec<Candidate> {
    let mut names: Vec<&str> = files.iter().map(|f| f.as_ref()).collect();
    names.sort_unstable();
    names.dedup();

    let keys: Vec<AccountFileKey> = names.iter().map(|f| infer_key(f)).collect();
    let mut best: HashMap<&str, usize> = HashMap::new();
    for (i, key) in keys.iter().enumerate() {
        let newer = match best.get(key.account.as_str()) {
            Some(&j) => key.date > keys[j].date,
            None => true,
        };
        if newer {
            best.insert(key.account.as_str(), i);
        }
    }

    names
        .iter()
        .zip(keys.iter())
        .enumerate()
        .map(|(i, (file, key))| Candidate {
            file: file.to_string(),
            key: key.clone(),
            kept: best.get(key.account.as_str()) == Some(&i),
        })
        .collect()
}

/// The latest file per account, sorted by name
pub fn select_latest<S: AsRef<str>>(files: &[S]) -> Vec<String> {
    evaluate(files)
        .into_iter()
        .filter(|c| c.kept)
        .map(|c| c.file)
        .collect()
}

pub fn is_statement_file(name: &str) -> bool {
    !name.starts_with('.')
        && Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| STATEMENT_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

fn visible_names(folder: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(folder).with_context(|| format!("reading {}", folder.display()))? {
        let entry = entry.with_context(|| format!("reading {}", folder.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Statement files in a folder, sorted by name
pub fn candidate_files(folder: &Path) -> Result<Vec<String>> {
    Ok(visible_names(folder)?
        .into_iter()
        .filter(|n| is_statement_file(n))
        .collect())
}

/// Non-hidden entries in a folder, statements or not
pub fn count_files(folder: &Path) -> Result<usize> {
    Ok(visible_names(folder)?.len())
}

/// The files of one folder that should be loaded
pub fn select_in_folder(folder: &Path) -> Result<Vec<String>> {
    let candidates = evaluate(&candidate_files(folder)?);
    for c in &candidates {
        debug!(
            folder = %folder.display(),
            file = %c.file,
            date = %c.key.date,
            account = %c.key.account,
            kept = c.kept,
            "statement selector"
        );
    }
    Ok(candidates.into_iter().filter(|c| c.kept).map(|c| c.file).collect())
}
