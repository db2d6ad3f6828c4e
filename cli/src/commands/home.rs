use anyhow::Result;
use parcelmap::{home_view, DashboardConfig, DatasetCache};

pub fn run(cache: &DatasetCache, config: &DashboardConfig) -> Result<()> {
    let view = home_view(cache, &config.view);
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
