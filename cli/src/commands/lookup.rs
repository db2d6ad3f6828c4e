use anyhow::{bail, Result};
use parcelmap::{property_info_response, DatasetCache};

use crate::cli::LookupArgs;

pub fn run(cache: &DatasetCache, args: &LookupArgs) -> Result<()> {
    let response = property_info_response(cache, &args.pin);
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    if !response.is_success() {
        bail!("[lookup] PIN {} returned status {}", args.pin.trim(), response.status);
    }
    Ok(())
}
