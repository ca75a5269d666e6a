//! folio-core: holding model, value normalization, and portfolio aggregation

pub mod holding;
pub mod summary;
pub mod value;

pub use holding::{AssetType, BOND_SYMBOL, CASH_SYMBOL, DESCRIPTION_CAP, Holding, cap_description};
pub use summary::{Breakdown, Summary, summarize, with_gain_loss};
pub use value::{RawValue, format_currency, normalize, round2};
