//! Positions CSV exports (manual downloads from the broker websites).
//!
//! Exports open with a few lines of preamble, then a header row. Two column
//! schemes are recognised:
//!   Last Price / Current Value / Cost Basis Total / Type      (Fidelity)
//!   Price / Market Value / Cost Basis / Security Type         (Schwab, and the fallback)

use anyhow::{Context, Result};
use folio_core::{AssetType, Holding, normalize};
use std::collections::HashMap;

use crate::assemble::{Assembler, RowMatch};
use crate::section::SectionContext;
use crate::types::{ParseOptions, StatementDocument};

const HEADER_KEYWORDS: &[&str] = &["symbol", "ticker"];
const SKIPPED_SYMBOLS: &[&str] = &["symbol", "pending activity", "nan"];
const ACCOUNT_TOTAL_PREFIX: &str = "account total";

/// Index of the first line that looks like a header row, 0 if none does
pub fn find_header_row<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .position(|l| {
            let lower = l.as_ref().to_lowercase();
            HEADER_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .unwrap_or(0)
}

/// Which set of column names the export uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvScheme {
    LastPriceCurrentValue,
    PriceMarketValue,
}

struct SchemeColumns {
    price: &'static str,
    value: &'static str,
    cost: &'static str,
    kind: &'static str,
    default_account: &'static str,
}

impl CsvScheme {
    pub fn detect(headers: &[&str]) -> Self {
        let has = |name: &str| headers.iter().any(|h| h.trim().eq_ignore_ascii_case(name));
        if has("last price") && has("current value") {
            CsvScheme::LastPriceCurrentValue
        } else {
            CsvScheme::PriceMarketValue
        }
    }

    fn columns(self) -> SchemeColumns {
        match self {
            CsvScheme::LastPriceCurrentValue => SchemeColumns {
                price: "last price",
                value: "current value",
                cost: "cost basis total",
                kind: "type",
                default_account: "Fidelity",
            },
            CsvScheme::PriceMarketValue => SchemeColumns {
                price: "price",
                value: "market value",
                cost: "cost basis",
                kind: "security type",
                default_account: "Schwab",
            },
        }
    }
}

/// Case-insensitive header lookup for one record
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            index.entry(h.trim().to_lowercase()).or_insert(i);
        }
        Self { index }
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> &'r str {
        self.index
            .get(name)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }
}

fn is_skipped_symbol(symbol: &str) -> bool {
    let lower = symbol.to_lowercase();
    lower.is_empty()
        || SKIPPED_SYMBOLS.contains(&lower.as_str())
        || lower.starts_with(ACCOUNT_TOTAL_PREFIX)
}

/// Parse a positions export. Rows carry their own symbols, so the
/// non-ticker list does not apply; the market-value gate still does.
pub fn parse_csv(doc: &StatementDocument, opts: &ParseOptions) -> Result<Vec<Holding>> {
    let text = doc.page(0).trim_start_matches('\u{feff}');
    let lines: Vec<&str> = text.lines().collect();
    let body = lines[find_header_row(&lines)..].join("\n");

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", doc.file_name()))?
        .clone();
    let columns = Columns::new(&headers);
    let header_names: Vec<&str> = headers.iter().collect();
    let scheme = CsvScheme::detect(&header_names);
    let cols = scheme.columns();

    let ctx = SectionContext::default();
    let mut out = Vec::new();
    for (n, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("{} data row {}", doc.file_name(), n + 1))?;

        let symbol = columns.get(&record, "symbol");
        if is_skipped_symbol(symbol) {
            continue;
        }

        let description = match columns.get(&record, "description") {
            "" => symbol,
            d => d,
        };
        let account = if !opts.account_label.is_empty() {
            opts.account_label.as_str()
        } else {
            match columns.get(&record, "account name") {
                "" => cols.default_account,
                name => name,
            }
        };

        let row = RowMatch::synthetic(
            symbol,
            description,
            [
                normalize(columns.get(&record, "quantity")),
                normalize(columns.get(&record, cols.price)),
                normalize(columns.get(&record, cols.value)),
                normalize(columns.get(&record, cols.cost)),
            ],
            AssetType::from_keywords(columns.get(&record, cols.kind)),
        );
        out.extend(Assembler::new(account).assemble(row, &ctx));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Institution;

    const FIDELITY_EXPORT: &str = "\u{feff}Account Number,Account Name,Symbol,Description,Quantity,Last Price,Current Value,Cost Basis Total,Type
Z12345678,INDIVIDUAL,AAPL,APPLE INC,50,$227.52,\"$11,376.00\",\"$8,500.00\",Margin
Z12345678,INDIVIDUAL,SPAXX**,HELD IN MONEY MARKET,,,\"$1,234.56\",,Cash
Z12345678,INDIVIDUAL,Pending Activity,,,,-$50.00,,
,,,,,,,,

\"The data and information in this spreadsheet is provided to you solely for your use.\"
";

    const SCHWAB_EXPORT: &str = r#""Positions for account Individual ...582 as of 10:00 PM ET, 2025/12/31"
""
"Symbol","Description","Quantity","Price","Market Value","Cost Basis","Security Type"
"VTI","VANGUARD TOTAL STOCK MARKET ETF","120","$236.58","$28,389.60","$22,000.00","ETFs & Closed End Funds"
"IGNORED","ZERO VALUE CO","10","$0.00","$0.00","$100.00","Equity"
"Cash & Cash Investments","--","--","--","$1,500.25","--","Cash and Money Market"
"Account Total","--","--","--","$29,889.85","$22,000.00","--"
"#;

    fn doc(text: &str) -> StatementDocument {
        StatementDocument::from_csv("Positions.csv", text)
    }

    #[test]
    fn test_find_header_row() {
        assert_eq!(find_header_row(&["preamble", "", "Ticker,Qty"]), 2);
        assert_eq!(find_header_row(&["no", "header"]), 0);
        assert_eq!(find_header_row::<&str>(&[]), 0);
    }

    #[test]
    fn test_scheme_detection() {
        assert_eq!(
            CsvScheme::detect(&["Symbol", "Last Price", " Current Value "]),
            CsvScheme::LastPriceCurrentValue
        );
        assert_eq!(CsvScheme::detect(&["Symbol", "Security Type"]), CsvScheme::PriceMarketValue);
        assert_eq!(CsvScheme::detect(&["Symbol", "Last Price"]), CsvScheme::PriceMarketValue);
    }

    #[test]
    fn test_fidelity_export() {
        let opts = ParseOptions::for_institution(Institution::Fidelity);
        let holdings = parse_csv(&doc(FIDELITY_EXPORT), &opts).unwrap();
        assert_eq!(holdings.len(), 2);

        let aapl = &holdings[0];
        assert_eq!(aapl.symbol, "AAPL");
        assert_eq!(aapl.account, "Fidelity");
        assert_eq!(aapl.quantity, 50.0);
        assert_eq!(aapl.last_price, 227.52);
        assert_eq!(aapl.market_value, 11376.0);
        assert_eq!(aapl.cost_basis, 8500.0);
        assert_eq!(aapl.asset_type, AssetType::Stock);

        let core = &holdings[1];
        assert_eq!(core.symbol, "SPAXX**");
        assert_eq!(core.asset_type, AssetType::Cash);
        assert_eq!(core.market_value, 1234.56);
    }

    #[test]
    fn test_account_name_column_when_label_empty() {
        let opts = ParseOptions {
            account_label: String::new(),
            ..ParseOptions::for_institution(Institution::Fidelity)
        };
        let holdings = parse_csv(&doc(FIDELITY_EXPORT), &opts).unwrap();
        assert!(holdings.iter().all(|h| h.account == "INDIVIDUAL"));
    }

    #[test]
    fn test_schwab_export_with_preamble() {
        let opts = ParseOptions::for_institution(Institution::Schwab);
        let holdings = parse_csv(&doc(SCHWAB_EXPORT), &opts).unwrap();
        let symbols: Vec<&str> = holdings.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["VTI", "Cash & Cash Investments"]);

        assert_eq!(holdings[0].account, "Schwab");
        assert_eq!(holdings[0].asset_type, AssetType::Etf);
        assert_eq!(holdings[0].market_value, 28389.6);
        assert_eq!(holdings[1].asset_type, AssetType::Cash);
        assert_eq!(holdings[1].quantity, 0.0);
        assert_eq!(holdings[1].description, "--");
    }

    #[test]
    fn test_empty_export() {
        let opts = ParseOptions::for_institution(Institution::Schwab);
        assert!(parse_csv(&doc(""), &opts).unwrap().is_empty());
    }
}
