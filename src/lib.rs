#![doc = "Parcel map public API: King County parcel polygons joined with assessment records"]
mod cache;
mod common;
mod config;
mod crs;
mod error;
mod geom;
mod io;
mod parcel;
mod query;

#[doc(inline)]
pub use cache::{CacheStatus, DatasetCache, DatasetSource, FileSource};

#[doc(inline)]
pub use config::{DashboardConfig, SourceConfig, ViewConfig};

#[doc(inline)]
pub use crs::CANONICAL_PROJ4;

#[doc(inline)]
pub use error::{JoinSide, LoadError, LookupError};

#[doc(inline)]
pub use geom::BoundingBox;

#[doc(inline)]
pub use parcel::{
    load_dataset, AssessmentField, AttributeValue, Attributes, EnrichedParcel, LoadStats, MergedDataset,
    NOT_AVAILABLE,
};

#[doc(inline)]
pub use query::{
    format_currency, home_view, lookup, lookup_in, property_info_response, spatial_subset, subset_of,
    ApiResponse, FeatureCollection, HomeView, PropertyInfo,
};
