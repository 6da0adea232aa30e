//! ROI pipeline for superhero-franchise movie financials.
//!
//! The crate resolves a delimited file of unknown encoding/delimiter into
//! typed records, derives return-on-investment and classification fields,
//! flags statistically extreme ROI values per filtered view, and produces
//! the grouped summaries a presentation layer renders (publisher
//! rankings, tier/type/year breakdowns, top-N film tables).

pub mod cache;
pub mod enrich;
pub mod error;
pub mod loader;
pub mod logging;
pub mod outlier;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod schema;
pub mod types;
pub mod util;

pub use error::{LoadError, PipelineError, Result, SchemaError};
pub use pipeline::{build_view, LoadResult, Pipeline, ViewFilter};
pub use types::{BudgetTier, MovieRecord, MovieType};
