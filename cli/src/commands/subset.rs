use std::fs;

use anyhow::{Context, Result};
use parcelmap::{spatial_subset, DashboardConfig, DatasetCache};

use crate::cli::SubsetArgs;

pub fn run(cache: &DatasetCache, config: &DashboardConfig, args: &SubsetArgs) -> Result<()> {
    let bounds = match (args.all, &args.bbox) {
        (true, _) => None,
        (false, Some(bbox)) => Some(bbox),
        (false, None) => Some(&config.view.default_bounds),
    };

    let parcels = spatial_subset(cache, bounds);
    tracing::info!(features = parcels.len(), "[subset] collected parcels");

    match &args.output {
        Some(path) => {
            fs::write(path, parcels.to_string())
                .with_context(|| format!("[subset] failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "[subset] wrote GeoJSON");
        }
        None => println!("{parcels}"),
    }
    Ok(())
}
