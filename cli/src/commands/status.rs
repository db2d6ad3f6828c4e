use anyhow::Result;
use parcelmap::DatasetCache;

/// Attempt a load, then report. A failed load still prints the status (with `last_error`).
pub fn run(cache: &DatasetCache) -> Result<()> {
    if let Err(e) = cache.get_or_load(false) {
        tracing::warn!(kind = e.kind(), "[status] load failed");
    }
    println!("{}", serde_json::to_string_pretty(&cache.status())?);
    Ok(())
}
