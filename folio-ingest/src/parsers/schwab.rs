//! Schwab brokerage statement parser (text)
//!
//! Expected extracted-text layout inside the position sections:
//!   Positions - Equities
//!   SYMBOL  DESCRIPTION  QTY  PRICE  MKTVAL  COSTBASIS  GAIN/LOSS ...
//!   META    METAPLATFORMSINC  100.0000  660.09  66,009.00  40,000.00  26,009.00 ...
//!   Positions - Fixed Income
//!   CUSIP      DESCRIPTION  [COUPON]  MATURITY  PAR  PRICE  MKTVAL  COSTBASIS
//!   91282CJL6  USTREASNOTE  4.50  11/15/33  10,000.00  101.25  10,125.00  9,950.00
//! and, anywhere in the document, the bank sweep line:
//!   BankSweep  CHARLESSCHWAB  1,500.25  20,825.65

use anyhow::Result;
use folio_core::{AssetType, BOND_SYMBOL, Holding, normalize};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::account::schwab_label;
use crate::assemble::{Assembler, RowMatch};
use crate::section::{Banner, SectionRules, SectionTracker};
use crate::types::{ParseOptions, StatementDocument};

static ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<sym>[A-Z][A-Z0-9\.\-]{0,5})\s+",
        r"\S.*?\s+",
        r"(?P<qty>[\d,]+\.\d+)\s+",
        r"(?P<price>[\d,]+\.\d+)\s+",
        r"(?P<mv>[\d,]+\.\d+)\s+",
        r"(?P<cb>[\d,]+\.\d+)\s+",
        r"(?P<gl>\(?[\d,]+\.\d+\)?|N/A)"
    ))
    .unwrap()
});

// Descriptions are printed without spaces, so the token after the symbol is the whole name
static ROW_DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9\.\-]{0,5}\s+(\S+)").unwrap());

static BOND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\S{9}\s+",
        r"(?P<desc>\S+)\s+",
        r"(?:[\d\.]+\s+)?",
        r"\d{2}/\d{2}/\d{2}\s+",
        r"(?P<qty>[\d,]+\.\d+)\s+",
        r"(?P<price>[\d,]+\.\d+)\s+",
        r"(?P<mv>[\d,]+\.\d+)\s+",
        r"(?P<cb>[\d,]+\.\d+)"
    ))
    .unwrap()
});

static RULES: Lazy<SectionRules> = Lazy::new(|| SectionRules {
    banners: vec![
        Banner::new("Positions - Equities", AssetType::Stock).unwrap(),
        Banner::new("Positions - Exchange Traded Funds", AssetType::Etf).unwrap(),
        Banner::new("Positions - Fixed Income", AssetType::Bond).unwrap(),
    ],
    banners_consume: true,
    exits: vec!["Positions - Options", "Transactions"],
    summary_prefixes: vec!["Total", "Estimated"],
    boilerplate: Vec::new(),
    cash_sweep: Some(Regex::new(r"BankSweep\s+\S+\s+[\d,]+\.\d+\s+([\d,]+\.\d+)").unwrap()),
    starts_in_positions: false,
});

/// Inline equity/ETF row: symbol, compressed description, then
/// quantity, price, market value, cost basis and gain/loss.
pub fn inline_row(line: &str) -> Option<RowMatch> {
    let caps = ROW.captures(line)?;
    let symbol = &caps["sym"];
    let description = ROW_DESCRIPTION
        .captures(line)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| symbol.to_string());
    Some(RowMatch::parsed(
        symbol,
        &description,
        [
            normalize(&caps["qty"]),
            normalize(&caps["price"]),
            normalize(&caps["mv"]),
            normalize(&caps["cb"]),
        ],
    ))
}

/// Fixed-income row keyed by CUSIP; the symbol is always the BOND sentinel.
pub fn bond_row(line: &str) -> Option<RowMatch> {
    let caps = BOND.captures(line)?;
    Some(RowMatch::synthetic(
        BOND_SYMBOL,
        &caps["desc"],
        [
            normalize(&caps["qty"]),
            normalize(&caps["price"]),
            normalize(&caps["mv"]),
            normalize(&caps["cb"]),
        ],
        AssetType::Bond,
    ))
}

/// Parse a Schwab statement into holdings, plus one cash holding for the sweep balance.
pub fn parse_schwab(doc: &StatementDocument, opts: &ParseOptions) -> Result<Vec<Holding>> {
    let assembler = Assembler::new(schwab_label(&opts.account_label, &doc.path));
    let mut tracker = SectionTracker::new(&RULES);
    let mut out = Vec::new();

    for line in doc.lines() {
        if !tracker.classify(&line).is_eligible() {
            continue;
        }
        let ctx = tracker.context();

        if let Some(row) = inline_row(&line) {
            out.extend(assembler.assemble(row, ctx));
            continue;
        }

        if ctx.current_asset_type == AssetType::Bond {
            if let Some(row) = bond_row(&line) {
                out.extend(assembler.assemble(row, ctx));
            }
        }
    }

    out.extend(assembler.cash(tracker.context()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Institution, StatementFormat};

    fn doc(name: &str, pages: &[&str]) -> StatementDocument {
        StatementDocument::from_pages(
            StatementFormat::Schwab,
            name,
            pages.iter().map(|p| p.to_string()).collect(),
        )
    }

    fn opts() -> ParseOptions {
        ParseOptions::for_institution(Institution::Schwab)
    }

    #[test]
    fn test_parse_schwab_basic() {
        let text = r#"
Schwab One® Account of JANE DOE
Positions - Equities
Symbol Description Quantity Price($) Market Value($) Cost Basis($) Unrealized Gain/(Loss)($)
META METAPLATFORMSINC 100.0000 660.09 66,009.00 40,000.00 26,009.00 0.32
INTC INTELCORP 50.0000 20.00 1,000.00 1,500.00 (500.00) N/A
Total Equities 67,009.00 41,500.00
Positions - Exchange Traded Funds
VTI VANGUARDTOTALSTOCK 120.0000 236.58 28,389.60 22,000.00 6,389.60 1.25
Estimated Annual Income 1,234.00
BankSweep CHARLESSCHWAB 1,500.25 20,825.65
"#;
        let holdings = parse_schwab(&doc("Brokerage Statement_2025-12-31_582.PDF", &[text]), &opts()).unwrap();
        assert_eq!(holdings.len(), 4);

        assert_eq!(holdings[0].symbol, "META");
        assert_eq!(holdings[0].description, "METAPLATFORMSINC");
        assert_eq!(holdings[0].account, "Schwab (582)");
        assert_eq!(holdings[0].quantity, 100.0);
        assert_eq!(holdings[0].market_value, 66009.0);
        assert_eq!(holdings[0].cost_basis, 40000.0);
        assert_eq!(holdings[0].asset_type, AssetType::Stock);

        assert_eq!(holdings[1].symbol, "INTC");
        assert_eq!(holdings[2].symbol, "VTI");
        assert_eq!(holdings[2].asset_type, AssetType::Etf);

        let cash = &holdings[3];
        assert_eq!(cash.symbol, "CASH");
        assert_eq!(cash.market_value, 20825.65);
        assert_eq!(cash.account, "Schwab (582)");
    }

    #[test]
    fn test_rows_outside_positions_are_ignored() {
        let text = r#"
Account Summary
META METAPLATFORMSINC 100.0000 660.09 66,009.00 40,000.00 26,009.00
Positions - Equities
AAPL APPLEINC 10.0000 227.52 2,275.20 1,800.00 475.20
Positions - Options
META CALL 1.0000 5.00 500.00 300.00 200.00
Transactions
MSFT MICROSOFTCORP 1.0000 415.26 415.26 400.00 15.26
"#;
        let holdings = parse_schwab(&doc("stmt.txt", &[text]), &opts()).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].account, "Schwab");
    }

    #[test]
    fn test_non_ticker_first_token_rejected() {
        let text = r#"
Positions - Equities
SIPC MEMBERSHIP 1.00 2.00 3.00 4.00 5.00
SEC RULE 1.00 2.00 3.00 4.00 5.00
IRA CUSTODIAN 1.00 2.00 3.00 4.00 5.00
ETF SHARES 1.00 2.00 3.00 4.00 5.00
LLC INTEREST 1.00 2.00 3.00 4.00 5.00
"#;
        let holdings = parse_schwab(&doc("stmt.txt", &[text]), &opts()).unwrap();
        assert!(holdings.is_empty());
    }

    #[test]
    fn test_fixed_income_rows() {
        let text = r#"
Positions - Fixed Income
91282CJL6 USTREASNOTE 4.50 11/15/33 10,000.00 101.25 10,125.00 9,950.00 175.00
912797KJ5 USTREASBILL 03/19/26 5,000.00 99.10 4,955.00 4,900.00 55.00
"#;
        let holdings = parse_schwab(&doc("stmt.txt", &[text]), &opts()).unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].symbol, "BOND");
        assert_eq!(holdings[0].description, "USTREASNOTE");
        assert_eq!(holdings[0].quantity, 10000.0);
        assert_eq!(holdings[0].market_value, 10125.0);
        assert_eq!(holdings[0].asset_type, AssetType::Bond);
        assert_eq!(holdings[1].cost_basis, 4900.0);
    }

    #[test]
    fn test_zero_value_rows_dropped() {
        let text = "Positions - Equities\nXYZ DELISTEDCO 10.0000 0.00 0.00 100.00 (100.00)";
        let holdings = parse_schwab(&doc("stmt.txt", &[text]), &opts()).unwrap();
        assert!(holdings.is_empty());
    }

    #[test]
    fn test_sections_span_pages() {
        let holdings = parse_schwab(
            &doc(
                "stmt.txt",
                &[
                    "Positions - Exchange Traded Funds",
                    "VOO VANGUARDS&P500 10.0000 501.18 5,011.80 4,200.00 811.80",
                ],
            ),
            &opts(),
        )
        .unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].asset_type, AssetType::Etf);
    }
}
