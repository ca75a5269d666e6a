//! Fidelity NetBenefits retirement statement parser (text)
//!
//! Page 2 lists the plan's funds:
//!   [fund name ...] BEG_SHARES END_SHARES $BEG_PRICE $END_PRICE $BEG_VALUE $END_VALUE
//! Fund names wrap, so part of the name may sit on the line above the numbers.

use anyhow::Result;
use folio_core::{AssetType, Holding, normalize};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::account::netbenefits_label;
use crate::assemble::{Assembler, RowMatch};
use crate::section::{SectionRules, SectionTracker};
use crate::tickers::initials_symbol;
use crate::types::StatementDocument;

/// Lines searched above a fund row for the rest of its name
pub const NAME_LOOKBACK: usize = 5;
const DEFAULT_FUND_NAME: &str = "401k Fund";

static FUND_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<beg_sh>[\d,]+\.\d+)\s+",
        r"(?P<end_sh>[\d,]+\.\d+)\s+",
        r"\$(?P<beg_px>[\d,]+\.\d+)\s+",
        r"\$(?P<end_px>[\d,]+\.\d+)\s+",
        r"\$(?P<beg_mv>[\d,]+\.\d+)\s+",
        r"\$(?P<end_mv>[\d,]+\.\d+)"
    ))
    .unwrap()
});

static RULES: Lazy<SectionRules> = Lazy::new(|| SectionRules {
    boilerplate: vec![
        "Shares as of",
        "Investment",
        "Tier ",
        "TIER ",
        "Account Totals",
        "Fidelity NetBenefits",
        "https://",
        "Page ",
    ],
    starts_in_positions: true,
    ..SectionRules::default()
});

/// One fund row, with its name assembled from the nearest usable line above
/// plus any name fragment in front of the numbers.
pub fn fund_row<S: AsRef<str>>(line: &str, lookback: &[S]) -> Option<RowMatch> {
    let caps = FUND_ROW.captures(line)?;
    let quantity = normalize(&caps["end_sh"]);
    let price = normalize(&caps["end_px"]);
    let value = normalize(&caps["end_mv"]);
    if value <= 0.0 || quantity <= 0.0 {
        return None;
    }

    let prefix = line[..caps.get(0)?.start()].trim();
    let mut prev_name = "";
    let lo = lookback.len().saturating_sub(NAME_LOOKBACK);
    for prev in lookback[lo..].iter().rev() {
        let prev = prev.as_ref().trim();
        if prev.is_empty() {
            continue;
        }
        if FUND_ROW.is_match(prev) {
            break;
        }
        if prev.contains('$') || RULES.is_boilerplate(prev) {
            continue;
        }
        prev_name = prev;
        break;
    }

    let description = if !prev_name.is_empty() {
        format!("{prev_name} {prefix}").trim().to_string()
    } else if !prefix.is_empty() {
        prefix.to_string()
    } else {
        DEFAULT_FUND_NAME.to_string()
    };
    let symbol = initials_symbol(&description);

    Some(RowMatch::synthetic(
        &symbol,
        &description,
        [quantity, price, value, 0.0],
        AssetType::MutualFund,
    ))
}

/// Parse a NetBenefits statement: account from page 1, funds from page 2
/// (or page 1 when the text has no page breaks).
pub fn parse_netbenefits(doc: &StatementDocument) -> Result<Vec<Holding>> {
    let assembler = Assembler::new(netbenefits_label(doc.page(0)));
    let fund_page = if doc.page_count() > 1 { doc.page(1) } else { doc.page(0) };
    let lines: Vec<&str> = fund_page.lines().map(str::trim).collect();

    let mut tracker = SectionTracker::new(&RULES);
    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !tracker.classify(line).is_eligible() {
            continue;
        }
        if let Some(row) = fund_row(line, &lines[..i]) {
            out.extend(assembler.assemble(row, tracker.context()));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatementFormat;

    const PAGE1: &str = "Retirement Savings Statement\nRED HAT 401(K) SAVINGS PLAN\nStatement Period: 10/01/2025 - 12/31/2025";

    const PAGE2: &str = r#"
Investment Shares as of 10/01/2025 Shares as of 12/31/2025 Price Price Value Value
TIER 1 - TARGET DATE FUNDS
VANGUARD TARGET
RETIREMENT 2050 1,000.000 1,050.500 $45.10 $48.20 $45,100.00 $50,634.10
Tier 2 - Index Funds
FIDELITY 500 INDEX 200.000 210.000 $190.00 $201.50 $38,000.00 $42,315.00
CLOSED FUND 10.000 0.000 $10.00 $0.00 $100.00 $0.00
Account Totals $83,100.00 $92,949.10
Page 2 of 4
"#;

    fn doc(pages: Vec<&str>) -> StatementDocument {
        StatementDocument::from_pages(
            StatementFormat::FidelityNetBenefits,
            "NetBenefits_Q4.pdf",
            pages.into_iter().map(String::from).collect(),
        )
    }

    #[test]
    fn test_parse_netbenefits_funds() {
        let holdings = parse_netbenefits(&doc(vec![PAGE1, PAGE2])).unwrap();
        assert_eq!(holdings.len(), 2);

        let first = &holdings[0];
        assert_eq!(first.account, "Fidelity 401k (Red Hat)");
        assert_eq!(first.description, "VANGUARD TARGET RETIREMENT 2050");
        assert_eq!(first.symbol, "VTR");
        assert_eq!(first.quantity, 1050.5);
        assert_eq!(first.last_price, 48.20);
        assert_eq!(first.market_value, 50634.10);
        assert_eq!(first.cost_basis, 0.0);
        assert_eq!(first.asset_type, AssetType::MutualFund);

        // The tier label above is boilerplate, so the name is the prefix alone
        let second = &holdings[1];
        assert_eq!(second.description, "FIDELITY 500 INDEX");
        assert_eq!(second.symbol, "FI");
    }

    #[test]
    fn test_name_lookback_stops_at_previous_row() {
        let lookback = ["ALPHA FUND 1.000 2.000 $1.00 $1.00 $1.00 $2.00", ""];
        let row = fund_row("1.000 3.000 $1.00 $1.50 $1.00 $4.50", &lookback).unwrap();
        assert_eq!(row.description, "401k Fund");
        assert_eq!(row.symbol, "F");
    }

    #[test]
    fn test_single_page_text_uses_page_one() {
        let text = format!("{PAGE1}\n{PAGE2}");
        let holdings = parse_netbenefits(&doc(vec![text.as_str()])).unwrap();
        assert_eq!(holdings.len(), 2);
    }
}
