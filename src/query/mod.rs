//! Read-only queries over the cached dataset, plus the response shapes a web layer serves.

mod api;
mod lookup;
mod subset;

pub use api::{home_view, property_info_response, ApiResponse, HomeView};
pub use lookup::{format_currency, lookup, lookup_in, PropertyInfo};
pub use subset::{spatial_subset, subset_of, FeatureCollection};
