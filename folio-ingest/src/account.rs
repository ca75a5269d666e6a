//! Account label resolution.
//!
//! Schwab encodes the account in the file name; Fidelity and NetBenefits
//! only say it somewhere in the document body.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static SCHWAB_ACCOUNT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)_(\d{3})\.(?:pdf|txt)$").unwrap());
static ROLLOVER_OWNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+ [A-Z]+)\s*[-–]\s*ROLLOVER IRA").unwrap());
static PLAN_COMPANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(FACEBOOK|META|GOOGLE|AMAZON|APPLE|MICROSOFT)").unwrap());
static RETIREMENT_PLAN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Retirement Savings Statement\s*\n(.+?)\n").unwrap());

const PLAN_NAME_CAP: usize = 40;

/// "Schwab (582)" for "Brokerage Statement_2025-12-31_582.PDF"; the base label otherwise
pub fn schwab_label(base: &str, path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match SCHWAB_ACCOUNT_SUFFIX.captures(&name) {
        Some(caps) => format!("{base} ({})", &caps[1]),
        None => base.to_string(),
    }
}

/// Account label from the body of a Fidelity statement
pub fn fidelity_label(text: &str) -> String {
    if text.contains("ROLLOVER IRA") {
        let owner = ROLLOVER_OWNER
            .captures(text)
            .map(|c| title_case(&c[1]))
            .unwrap_or_else(|| "Rollover".to_string());
        return format!("Fidelity IRA ({owner})");
    }
    if text.contains("BROKERAGELINK") || text.contains("NON-PROTOTYPE") {
        let company = PLAN_COMPANY
            .captures(text)
            .map(|c| title_case(&c[1]))
            .unwrap_or_else(|| "BrokerageLink".to_string());
        return format!("Fidelity 401k ({company})");
    }
    if text.contains("INDIVIDUAL") {
        return "Fidelity Individual".to_string();
    }
    "Fidelity".to_string()
}

/// Account label from page 1 of a NetBenefits retirement statement
pub fn netbenefits_label(first_page: &str) -> String {
    let upper = first_page.to_uppercase();
    if upper.contains("RED HAT") {
        return "Fidelity 401k (Red Hat)".to_string();
    }
    if upper.contains("MICROSOFT") {
        return "Fidelity 401k (Microsoft)".to_string();
    }
    RETIREMENT_PLAN_NAME
        .captures(first_page)
        .map(|c| c[1].trim().chars().take(PLAN_NAME_CAP).collect())
        .unwrap_or_else(|| "Fidelity 401k".to_string())
}

/// Stock-plan account: the base label, qualified by the plan's ticker when the issuer was recognised
pub fn stock_plan_label(base: &str, recognised_symbol: Option<&str>) -> String {
    match recognised_symbol {
        Some(sym) => format!("{base} ({sym})"),
        None => base.to_string(),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schwab_label_from_file_name() {
        assert_eq!(
            schwab_label("Schwab", Path::new("/data/schwab/Brokerage Statement_2025-12-31_582.PDF")),
            "Schwab (582)"
        );
        assert_eq!(schwab_label("Schwab", Path::new("stmt_2025-12-31_582.txt")), "Schwab (582)");
        assert_eq!(schwab_label("Schwab", Path::new("statement.pdf")), "Schwab");
    }

    #[test]
    fn test_fidelity_rollover_owner() {
        let text = "Account Summary\nJANE DOE - ROLLOVER IRA\nAccount # X12-345678";
        assert_eq!(fidelity_label(text), "Fidelity IRA (Jane Doe)");
        assert_eq!(fidelity_label("ROLLOVER IRA"), "Fidelity IRA (Rollover)");
    }

    #[test]
    fn test_fidelity_brokeragelink_company() {
        let text = "META PLATFORMS 401(K) PLAN\nBROKERAGELINK";
        assert_eq!(fidelity_label(text), "Fidelity 401k (Meta)");
        assert_eq!(fidelity_label("NON-PROTOTYPE PLAN"), "Fidelity 401k (BrokerageLink)");
    }

    #[test]
    fn test_fidelity_individual_and_default() {
        assert_eq!(fidelity_label("INDIVIDUAL - TOD"), "Fidelity Individual");
        assert_eq!(fidelity_label("Investment Report"), "Fidelity");
    }

    #[test]
    fn test_netbenefits_label() {
        assert_eq!(netbenefits_label("Red Hat 401(k) Plan"), "Fidelity 401k (Red Hat)");
        assert_eq!(netbenefits_label("Microsoft Savings Plus"), "Fidelity 401k (Microsoft)");
        assert_eq!(
            netbenefits_label("Retirement Savings Statement\n  ACME CORP 401(K) PLAN  \nJan 1"),
            "ACME CORP 401(K) PLAN"
        );
        assert_eq!(netbenefits_label("nothing useful"), "Fidelity 401k");
    }

    #[test]
    fn test_stock_plan_label() {
        assert_eq!(stock_plan_label("Morgan Stanley", Some("MSFT")), "Morgan Stanley (MSFT)");
        assert_eq!(stock_plan_label("Morgan Stanley", None), "Morgan Stanley");
    }
}
