//! One matcher pipeline per statement format.

pub mod csv_export;
pub mod fidelity;
pub mod morgan_stanley;
pub mod netbenefits;
pub mod schwab;

use anyhow::Result;
use folio_core::Holding;
use tracing::debug;

use crate::types::{ParseOptions, StatementDocument, StatementFormat};

pub use csv_export::parse_csv;
pub use fidelity::parse_fidelity;
pub use morgan_stanley::parse_morgan_stanley;
pub use netbenefits::parse_netbenefits;
pub use schwab::parse_schwab;

/// Run the grammar selected by the document's format.
///
/// Holdings come back in document order; a document with no recognisable
/// rows yields an empty vector rather than an error.
pub fn parse_document(doc: &StatementDocument, opts: &ParseOptions) -> Result<Vec<Holding>> {
    let holdings = match doc.format {
        StatementFormat::Schwab => parse_schwab(doc, opts)?,
        StatementFormat::Fidelity => parse_fidelity(doc)?,
        StatementFormat::FidelityNetBenefits => parse_netbenefits(doc)?,
        StatementFormat::MorganStanley => parse_morgan_stanley(doc, opts)?,
        StatementFormat::GenericCsv => parse_csv(doc, opts)?,
    };
    debug!(
        file = %doc.file_name(),
        format = ?doc.format,
        positions = holdings.len(),
        "parsed statement"
    );
    Ok(holdings)
}
