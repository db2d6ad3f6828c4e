//! Enriched parcels: the assessment schema, the merged dataset and the load pipeline.

mod dataset;
mod merge;
mod schema;

pub use dataset::{EnrichedParcel, LoadStats, MergedDataset};
pub use merge::load_dataset;
pub use schema::{AssessmentField, AttributeValue, Attributes, NOT_AVAILABLE};
