//! folio-ingest: statement documents and the per-broker grammars that turn
//! their text into holdings.

pub mod account;
pub mod assemble;
pub mod parsers;
pub mod section;
pub mod tickers;
pub mod types;

pub use assemble::{Assembler, RowMatch};
pub use parsers::parse_document;
pub use section::{LineClass, SectionContext, SectionRules, SectionTracker};
pub use types::{
    DEFAULT_ESPP_SYMBOL, DocumentBody, Institution, ParseOptions, StatementDocument, StatementFormat,
};
