//! Ticker heuristics: tokens that look like tickers but are not, synthetic
//! fund symbols, and the issuer-name lookup for stock-plan statements.

/// Uppercase tokens that show up where a ticker would be but never are one:
/// entity suffixes, currency codes, clearing-house and identifier acronyms,
/// and short English words from disclosures.
pub const NON_TICKER: &[&str] = &[
    "SIPC", "SEC", "NFS", "FBS", "IRA", "ETF", "ETN", "INC", "CL", "STK", "COM", "LLC", "LTD",
    "USD", "EUR", "NPV", "CAP", "ADR", "NA", "ISIN", "SEDOL", "CUSIP", "ACT", "ALL", "ANY", "FOR",
    "THE", "AND", "ARE", "NOT", "MAY", "SPA", "SPC", "AMP",
];

pub fn is_non_ticker(token: &str) -> bool {
    NON_TICKER.contains(&token)
}

/// Fallback symbol when a fund description has no letters at all
pub const FUND_SYMBOL: &str = "FUND";
const INITIALS_CAP: usize = 6;

/// Symbol made of the initials of the alphabetic words of a description,
/// e.g. "Vanguard Target Retirement 2050" -> "VTR".
///
/// Different funds can share initials; no attempt is made to tell them apart.
pub fn initials_symbol(description: &str) -> String {
    let sym: String = description
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase)
        .take(INITIALS_CAP)
        .collect();
    if sym.is_empty() {
        FUND_SYMBOL.to_string()
    } else {
        sym
    }
}

/// Issuer keyword -> ticker, checked in order
const ISSUER_TICKERS: &[(&str, &str)] = &[
    ("MICROSOFT", "MSFT"),
    ("APPLE", "AAPL"),
    ("GOOGLE", "GOOGL"),
    ("AMAZON", "AMZN"),
    ("META", "META"),
];

/// Ticker for an issuer name, if it mentions a known company
pub fn issuer_symbol(issuer: &str) -> Option<&'static str> {
    let upper = issuer.to_uppercase();
    ISSUER_TICKERS
        .iter()
        .find(|(kw, _)| upper.contains(kw))
        .map(|(_, sym)| *sym)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denylist() {
        for t in ["SIPC", "SEC", "IRA", "ETF", "LLC", "INC", "USD"] {
            assert!(is_non_ticker(t), "{t} should be rejected");
        }
        for t in ["AAPL", "VTSAX", "BRK.B", "META"] {
            assert!(!is_non_ticker(t), "{t} should be accepted");
        }
    }

    #[test]
    fn test_initials_symbol() {
        assert_eq!(initials_symbol("Vanguard Target Retirement 2050"), "VTR");
        assert_eq!(initials_symbol("fidelity contrafund k6"), "FCK");
        assert_eq!(initials_symbol("A B C D E F G H"), "ABCDEF");
        assert_eq!(initials_symbol("2050 $12.00"), "FUND");
        assert_eq!(initials_symbol(""), "FUND");
    }

    #[test]
    fn test_issuer_symbol() {
        assert_eq!(issuer_symbol("Microsoft Corporation"), Some("MSFT"));
        assert_eq!(issuer_symbol("ALPHABET INC (GOOGLE)"), Some("GOOGL"));
        assert_eq!(issuer_symbol("INTERNATIONAL BUSINESS MACHINES"), None);
    }
}
