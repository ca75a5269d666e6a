//! Morgan Stanley stock-plan (ESPP) statement parser (text)
//!
//! Page 1 carries one summary block; each labelled line shows an opening and
//! a closing column, and the closing one is always the rightmost number:
//!   Issuer Description: INTERNATIONAL BUSINESS MACHINES
//!   Number of Shares    90.000    98.000
//!   Share Price         $250.12   $296.21
//!   Share Value         $22,510.80 $29,028.58

use anyhow::Result;
use folio_core::{AssetType, Holding, normalize, round2};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::account::stock_plan_label;
use crate::assemble::{Assembler, RowMatch};
use crate::section::SectionContext;
use crate::tickers::issuer_symbol;
use crate::types::{ParseOptions, StatementDocument};

static ISSUER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Issuer Description:\s+(.+?)(?:\n|$)").unwrap());
static STAT_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d,]+\.\d{2,}").unwrap());

static SHARES_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Number of Shares\s+(.*?)(?:\n|$)").unwrap());
static PRICE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Share Price\s+(.*?)(?:\n|$)").unwrap());
static VALUE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Share Value\s+(.*?)(?:\n|$)").unwrap());

/// Last qualifying number on the first line matching `label`, 0 when absent
fn closing_value(label: &Regex, text: &str) -> f64 {
    label
        .captures(text)
        .and_then(|c| STAT_NUMBER.find_iter(c.get(1)?.as_str()).last())
        .map(|m| normalize(m.as_str()))
        .unwrap_or(0.0)
}

/// The plan summary block as a row, or None when the statement reports no shares.
///
/// Returns the row and whether the issuer was recognised.
pub fn summary_row(text: &str, fallback_symbol: &str) -> Option<(RowMatch, bool)> {
    let quantity = closing_value(&SHARES_LINE, text);
    let price = closing_value(&PRICE_LINE, text);
    let mut value = closing_value(&VALUE_LINE, text);

    if value == 0.0 && quantity > 0.0 && price > 0.0 {
        value = round2(quantity * price);
    }
    if quantity == 0.0 && value == 0.0 {
        return None;
    }

    let issuer = ISSUER.captures(text).map(|c| c[1].trim().to_string());
    let recognised = issuer.as_deref().and_then(issuer_symbol);
    let symbol = recognised.unwrap_or(fallback_symbol);
    let description = issuer.unwrap_or_else(|| symbol.to_string());

    Some((
        RowMatch::synthetic(symbol, &description, [quantity, price, value, 0.0], AssetType::Stock),
        recognised.is_some(),
    ))
}

/// Parse a stock-plan statement into at most one holding.
pub fn parse_morgan_stanley(doc: &StatementDocument, opts: &ParseOptions) -> Result<Vec<Holding>> {
    let Some((row, recognised)) = summary_row(doc.page(0), &opts.espp_fallback_symbol) else {
        debug!(file = %doc.file_name(), "no shares reported");
        return Ok(Vec::new());
    };

    let label = stock_plan_label(&opts.account_label, recognised.then_some(row.symbol.as_str()));
    let assembler = Assembler::new(label);
    Ok(assembler.assemble(row, &SectionContext::default()).into_iter().collect())
}
