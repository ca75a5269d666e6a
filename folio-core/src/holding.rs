//! Holding record types: one normalized position per statement line

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker sentinel for the synthetic cash/sweep position
pub const CASH_SYMBOL: &str = "CASH";
/// Ticker sentinel for fixed-income rows, which carry a CUSIP instead of a ticker
pub const BOND_SYMBOL: &str = "BOND";
/// Maximum length of a holding description
pub const DESCRIPTION_CAP: usize = 60;

/// A single position extracted from a brokerage statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Human-readable account label, e.g. "Schwab (582)" or "Fidelity IRA (Jane Doe)"
    pub account: String,
    /// Ticker, or one of the CASH/BOND sentinels
    pub symbol: String,
    pub description: String,
    pub quantity: f64,
    pub last_price: f64,
    pub market_value: f64,
    pub cost_basis: f64,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Set by the aggregator; absent on freshly parsed holdings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain_loss_pct: Option<f64>,
}

/// Asset class of a holding
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetType {
    #[default]
    #[serde(rename = "Stock")]
    Stock,
    #[serde(rename = "ETF")]
    Etf,
    #[serde(rename = "Bond")]
    Bond,
    #[serde(rename = "Mutual Fund")]
    MutualFund,
    #[serde(rename = "Cash")]
    Cash,
}

impl AssetType {
    pub fn label(&self) -> &'static str {
        match self {
            AssetType::Stock => "Stock",
            AssetType::Etf => "ETF",
            AssetType::Bond => "Bond",
            AssetType::MutualFund => "Mutual Fund",
            AssetType::Cash => "Cash",
        }
    }

    /// Map a free-text security type (CSV exports) onto an asset class.
    /// Unknown or empty text falls back to Stock.
    pub fn from_keywords(text: &str) -> Self {
        let t = text.to_lowercase();
        if t.contains("etf") || t.contains("exchange traded") {
            AssetType::Etf
        } else if t.contains("mutual fund") {
            AssetType::MutualFund
        } else if t.contains("bond") || t.contains("fixed income") {
            AssetType::Bond
        } else if t.contains("cash") || t.contains("money market") {
            AssetType::Cash
        } else {
            AssetType::Stock
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Holding {
    /// Create a new Holding; the description is capped at [`DESCRIPTION_CAP`] characters
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account: impl Into<String>,
        symbol: impl Into<String>,
        description: &str,
        quantity: f64,
        last_price: f64,
        market_value: f64,
        cost_basis: f64,
        asset_type: AssetType,
    ) -> Self {
        Self {
            account: account.into(),
            symbol: symbol.into(),
            description: cap_description(description),
            quantity,
            last_price,
            market_value,
            cost_basis,
            asset_type,
            gain_loss: None,
            gain_loss_pct: None,
        }
    }

    /// The single synthetic position standing in for a statement's cash sweep
    pub fn cash(account: impl Into<String>, balance: f64) -> Self {
        Self::new(
            account,
            CASH_SYMBOL,
            "Cash & Sweep",
            1.0,
            balance,
            balance,
            balance,
            AssetType::Cash,
        )
    }

    pub fn is_cash_sentinel(&self) -> bool {
        self.symbol == CASH_SYMBOL
    }
}

/// Trim and truncate to [`DESCRIPTION_CAP`] characters (char-boundary safe)
pub fn cap_description(s: &str) -> String {
    s.trim().chars().take(DESCRIPTION_CAP).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holding_creation_caps_description() {
        let long = "X".repeat(100);
        let h = Holding::new("Schwab", "META", &long, 1.0, 2.0, 2.0, 1.0, AssetType::Stock);
        assert_eq!(h.description.len(), DESCRIPTION_CAP);
        assert!(h.gain_loss.is_none());
    }

    #[test]
    fn test_cash_sentinel() {
        let h = Holding::cash("Schwab (582)", 20825.65);
        assert!(h.is_cash_sentinel());
        assert_eq!(h.quantity, 1.0);
        assert_eq!(h.market_value, 20825.65);
        assert_eq!(h.cost_basis, 20825.65);
        assert_eq!(h.asset_type, AssetType::Cash);
    }

    #[test]
    fn test_asset_type_serde_names() {
        let json = serde_json::to_string(&AssetType::MutualFund).unwrap();
        assert_eq!(json, "\"Mutual Fund\"");
        let back: AssetType = serde_json::from_str("\"ETF\"").unwrap();
        assert_eq!(back, AssetType::Etf);
    }

    #[test]
    fn test_asset_type_keywords() {
        assert_eq!(AssetType::from_keywords("ETFs & Closed End Funds"), AssetType::Etf);
        assert_eq!(AssetType::from_keywords("Mutual Fund"), AssetType::MutualFund);
        assert_eq!(AssetType::from_keywords("Fixed Income"), AssetType::Bond);
        assert_eq!(AssetType::from_keywords("Cash and Money Market"), AssetType::Cash);
        assert_eq!(AssetType::from_keywords("Equity"), AssetType::Stock);
        assert_eq!(AssetType::from_keywords(""), AssetType::Stock);
    }
}
