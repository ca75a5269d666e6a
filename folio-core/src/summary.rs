//! Aggregator: totals, gain/loss, and account/allocation breakdowns over a
//! finalized list of holdings.

use crate::holding::Holding;
use crate::value::round2;
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Portfolio summary handed to reporting layers
#[derive(Debug, Clone, serde::Serialize)]
pub struct Summary {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain: f64,
    pub total_gain_pct: f64,
    /// Positions excluding the synthetic cash sentinel
    pub num_positions: usize,
    pub accounts: Breakdown,
    pub allocation: Breakdown,
    /// Holdings with gain/loss filled in, largest market value first
    pub holdings: Vec<Holding>,
}

/// Value per group, ordered by value descending.
///
/// Serializes as a map whose key order follows that ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown(Vec<(String, f64)>);

impl Breakdown {
    fn from_totals(totals: BTreeMap<String, f64>) -> Self {
        let mut entries: Vec<(String, f64)> = totals
            .into_iter()
            .map(|(name, value)| (name, round2(value)))
            .collect();
        // Stable: ties keep the BTreeMap (alphabetical) order.
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        Breakdown(entries)
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

/// Fill in per-holding gain/loss. Percentage is 0 when cost basis is not positive.
pub fn with_gain_loss(mut holding: Holding) -> Holding {
    let gain = holding.market_value - holding.cost_basis;
    let pct = if holding.cost_basis > 0.0 {
        gain / holding.cost_basis * 100.0
    } else {
        0.0
    };
    holding.gain_loss = Some(gain);
    holding.gain_loss_pct = Some(pct);
    holding
}

/// Summarize a finalized list of holdings.
pub fn summarize(holdings: Vec<Holding>) -> Summary {
    let mut holdings: Vec<Holding> = holdings.into_iter().map(with_gain_loss).collect();

    let total_value: f64 = holdings.iter().map(|h| h.market_value).sum();
    let total_cost: f64 = holdings.iter().map(|h| h.cost_basis).sum();
    let total_gain = total_value - total_cost;
    let total_gain_pct = if total_cost > 0.0 {
        total_gain / total_cost * 100.0
    } else {
        0.0
    };

    let mut accounts: BTreeMap<String, f64> = BTreeMap::new();
    let mut allocation: BTreeMap<String, f64> = BTreeMap::new();
    for h in &holdings {
        *accounts.entry(h.account.clone()).or_default() += h.market_value;
        *allocation.entry(h.asset_type.label().to_string()).or_default() += h.market_value;
    }

    let num_positions = holdings.iter().filter(|h| !h.is_cash_sentinel()).count();

    holdings.sort_by(|a, b| b.market_value.total_cmp(&a.market_value));

    Summary {
        total_value: round2(total_value),
        total_cost: round2(total_cost),
        total_gain: round2(total_gain),
        total_gain_pct: round2(total_gain_pct),
        num_positions,
        accounts: Breakdown::from_totals(accounts),
        allocation: Breakdown::from_totals(allocation),
        holdings,
    }
}
