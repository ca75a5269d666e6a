//! Fidelity brokerage statement parser (text)
//!
//! Two row shapes appear in the holdings tables:
//!   A) DESCRIPTION (SYM) QTY PRICE MKTVAL COST ...        symbol and numbers on one line
//!   B) DESCRIPTION QTY PRICE MKTVAL COST ...               numbers first ...
//!      CONTINUATION OF DESCRIPTION (SYM)                   ... symbol on a later line

use anyhow::Result;
use folio_core::{AssetType, Holding, normalize};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::account::fidelity_label;
use crate::assemble::{Assembler, RowMatch};
use crate::section::{Banner, SectionRules, SectionTracker};
use crate::types::StatementDocument;

/// How many preceding lines a deferred symbol may look back for its numbers
pub const DEFERRED_LOOKBACK: usize = 4;
const MIN_DESCRIPTION_LEN: usize = 3;

static INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<desc>.+?)\((?P<sym>[A-Z][A-Z0-9\.]{0,5})\)\s+",
        r"(?P<qty>[\d,]+\.\d+)\s+",
        r"\$?(?P<price>[\d,]+\.\d+)\s+",
        r"\$?(?P<mv>[\d,]+\.\d+)\s+",
        r"\$?(?P<cb>[\d,]+\.\d+|not applicable)"
    ))
    .unwrap()
});

static SYMBOL_ANYWHERE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?P<sym>[A-Z][A-Z0-9\.]{0,5})\)").unwrap());

static NUMBERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<qty>[\d,]+\.\d+)\s+",
        r"\$?(?P<price>[\d,]+\.\d+)\s+",
        r"\$?(?P<mv>[\d,]+\.\d+)\s+",
        r"\$?(?P<cb>[\d,]+\.\d+|not applicable)"
    ))
    .unwrap()
});

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d,]+\.\d+").unwrap());

static RULES: Lazy<SectionRules> = Lazy::new(|| SectionRules {
    banners: vec![
        Banner::new(r"(?i)mutual fund", AssetType::MutualFund).unwrap(),
        Banner::new(r"(?i)exchange traded|equity etp", AssetType::Etf).unwrap(),
        Banner::new(r"(?i)^stocks|common stock", AssetType::Stock).unwrap(),
        Banner::new(r"(?i)core account|money market", AssetType::Cash).unwrap(),
    ],
    banners_consume: false,
    exits: Vec::new(),
    summary_prefixes: vec![
        "Total ",
        "Price",
        "Description",
        "All positions",
        "Copyright",
        "Schwab",
        "Fidelity",
        "Information About",
        "Lost or Stolen",
        "Additional",
        "Income Summary",
        "Account Summary",
    ],
    boilerplate: Vec::new(),
    cash_sweep: None,
    starts_in_positions: true,
});

fn four_values(caps: &regex::Captures<'_>) -> [f64; 4] {
    [
        normalize(&caps["qty"]),
        normalize(&caps["price"]),
        normalize(&caps["mv"]),
        normalize(&caps["cb"]),
    ]
}

/// Shape A: "DESCRIPTION (SYM) QTY PRICE MKTVAL COST"
pub fn inline_row(line: &str) -> Option<RowMatch> {
    let caps = INLINE.captures(line)?;
    Some(RowMatch::parsed(&caps["sym"], caps["desc"].trim(), four_values(&caps)))
}

/// Shape B: a "(SYM)" whose numbers sit on one of the preceding lines.
///
/// `lookback` holds the lines before `line` in document order. Only the last
/// [`DEFERRED_LOOKBACK`] are searched for numbers; one more above that may
/// supply the description. A line with three or more numbers after the
/// symbol belongs to the inline grammar (or is a totals row) and is refused.
pub fn deferred_symbol_row<S: AsRef<str>>(line: &str, lookback: &[S]) -> Option<RowMatch> {
    let caps = SYMBOL_ANYWHERE.captures(line)?;
    let symbol = &caps["sym"];
    let after_symbol = &line[caps.get(0)?.end()..];
    if DECIMAL.find_iter(after_symbol).count() >= 3 {
        return None;
    }

    let lo = lookback.len().saturating_sub(DEFERRED_LOOKBACK);
    for j in (lo..lookback.len()).rev() {
        let prev = lookback[j].as_ref().trim();
        let Some(nums) = NUMBERS.captures(prev) else {
            continue;
        };
        let start = nums.get(0)?.start();
        let mut description = prev[..start].trim().to_string();
        if description.is_empty() {
            description = symbol.to_string();
        }
        if description.chars().count() < MIN_DESCRIPTION_LEN && j > 0 {
            description = lookback[j - 1].as_ref().trim().to_string();
        }
        return Some(RowMatch::parsed(symbol, &description, four_values(&nums)));
    }

    None
}

/// Statements that only report an employee stock plan carry no position tables
pub fn is_stock_plan_only(text: &str) -> bool {
    text.contains("Stock Plans")
        && !text.contains("Common Stock")
        && !text.contains("Mutual Funds")
        && !text.contains("Exchange Traded")
}

/// Parse a Fidelity brokerage/IRA/BrokerageLink statement into holdings.
pub fn parse_fidelity(doc: &StatementDocument) -> Result<Vec<Holding>> {
    let text = doc.full_text();
    if is_stock_plan_only(&text) {
        debug!(file = %doc.file_name(), "stock-plan-only statement, no positions");
        return Ok(Vec::new());
    }

    let assembler = Assembler::new(fidelity_label(&text));
    let lines = doc.lines();
    let mut tracker = SectionTracker::new(&RULES);
    let mut out = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if !tracker.classify(line).is_eligible() {
            continue;
        }
        let ctx = tracker.context();

        // An inline match owns the line even when it is gated out
        if let Some(row) = inline_row(line) {
            out.extend(assembler.assemble(row, ctx));
            continue;
        }

        let window = &lines[i.saturating_sub(DEFERRED_LOOKBACK + 1)..i];
        if let Some(row) = deferred_symbol_row(line, window) {
            out.extend(assembler.assemble(row, ctx));
        }
    }

    Ok(out)
}
