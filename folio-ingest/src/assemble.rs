//! Record assembler: turns matcher captures plus section/account context
//! into canonical holdings, applying the validity gates shared by every
//! grammar.

use folio_core::{AssetType, Holding};

use crate::section::SectionContext;
use crate::tickers::is_non_ticker;

/// Captures from one grammar match, already normalized to numbers
#[derive(Debug, Clone, PartialEq)]
pub struct RowMatch {
    pub symbol: String,
    pub description: String,
    pub quantity: f64,
    pub last_price: f64,
    pub market_value: f64,
    pub cost_basis: f64,
    /// Set when the grammar itself fixes the asset class; otherwise the section decides
    pub asset_type: Option<AssetType>,
    /// True when the symbol was read out of free text and may be a false-positive ticker
    pub symbol_from_text: bool,
}

impl RowMatch {
    /// A row whose symbol token came straight out of the statement text
    pub fn parsed(symbol: &str, description: &str, values: [f64; 4]) -> Self {
        let [quantity, last_price, market_value, cost_basis] = values;
        Self {
            symbol: symbol.to_string(),
            description: description.to_string(),
            quantity,
            last_price,
            market_value,
            cost_basis,
            asset_type: None,
            symbol_from_text: true,
        }
    }

    /// A row with a synthesized or authoritative symbol and a fixed asset class
    pub fn synthetic(symbol: &str, description: &str, values: [f64; 4], asset_type: AssetType) -> Self {
        Self {
            asset_type: Some(asset_type),
            symbol_from_text: false,
            ..Self::parsed(symbol, description, values)
        }
    }
}

/// Builds holdings for one document's resolved account
#[derive(Debug, Clone)]
pub struct Assembler {
    account: String,
}

impl Assembler {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Apply gates and context. Rows that fail a gate are dropped silently:
    /// a non-positive market value, or a text-derived symbol on the non-ticker list.
    pub fn assemble(&self, row: RowMatch, ctx: &SectionContext) -> Option<Holding> {
        if row.market_value <= 0.0 {
            return None;
        }
        if row.symbol_from_text && is_non_ticker(&row.symbol) {
            return None;
        }
        let asset_type = row.asset_type.unwrap_or(ctx.current_asset_type);
        Some(Holding::new(
            self.account.clone(),
            row.symbol,
            &row.description,
            row.quantity,
            row.last_price,
            row.market_value,
            row.cost_basis,
            asset_type,
        ))
    }

    /// The synthetic cash holding for the sweep balance seen in this document, if any
    pub fn cash(&self, ctx: &SectionContext) -> Option<Holding> {
        (ctx.cash_accumulator > 0.0).then(|| Holding::cash(self.account.clone(), ctx.cash_accumulator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(asset_type: AssetType) -> SectionContext {
        SectionContext {
            current_asset_type: asset_type,
            in_positions: true,
            cash_accumulator: 0.0,
        }
    }

    #[test]
    fn test_section_type_applies_when_row_has_none() {
        let a = Assembler::new("Schwab (582)");
        let h = a
            .assemble(RowMatch::parsed("VTI", "VANGUARD", [10.0, 2.0, 20.0, 15.0]), &ctx(AssetType::Etf))
            .unwrap();
        assert_eq!(h.account, "Schwab (582)");
        assert_eq!(h.asset_type, AssetType::Etf);
        assert_eq!(h.market_value, 20.0);
    }

    #[test]
    fn test_fixed_asset_type_wins() {
        let a = Assembler::new("X");
        let row = RowMatch::synthetic("BOND", "USTREAS", [1.0, 1.0, 1.0, 1.0], AssetType::Bond);
        let h = a.assemble(row, &ctx(AssetType::Stock)).unwrap();
        assert_eq!(h.asset_type, AssetType::Bond);
    }

    #[test]
    fn test_gates() {
        let a = Assembler::new("X");
        let zero = RowMatch::parsed("AAPL", "APPLE", [1.0, 0.0, 0.0, 0.0]);
        assert!(a.assemble(zero, &ctx(AssetType::Stock)).is_none());

        let denied = RowMatch::parsed("ETF", "SOMETHING", [1.0, 1.0, 1.0, 1.0]);
        assert!(a.assemble(denied, &ctx(AssetType::Stock)).is_none());

        // The denylist only applies to symbols lifted from free text
        let authoritative = RowMatch::synthetic("ETF", "SOMETHING", [1.0, 1.0, 1.0, 1.0], AssetType::Etf);
        assert!(a.assemble(authoritative, &ctx(AssetType::Stock)).is_some());
    }

    #[test]
    fn test_cash_only_when_positive() {
        let a = Assembler::new("X");
        assert!(a.cash(&ctx(AssetType::Stock)).is_none());
        let mut c = ctx(AssetType::Stock);
        c.cash_accumulator = 12.5;
        assert_eq!(a.cash(&c).unwrap().market_value, 12.5);
    }
}
