use std::path::PathBuf;

use parcelmap::BoundingBox;

/// Parcel map CLI
#[derive(clap::Parser, Debug)]
#[command(name = "parcelmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// YAML configuration file
    #[arg(long, env = "PARCELMAP_CONFIG", global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Parcel shapefile (.shp), overrides the configured path
    #[arg(long, env = "PARCELMAP_PARCELS", global = true, value_hint = clap::ValueHint::FilePath)]
    pub parcels: Option<PathBuf>,

    /// Assessment CSV, overrides the configured path
    #[arg(long, env = "PARCELMAP_ASSESSMENTS", global = true, value_hint = clap::ValueHint::FilePath)]
    pub assessments: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print the property info for one PIN (exits non-zero if not found)
    Lookup(LookupArgs),

    /// Print parcels in a bounding box as GeoJSON
    Subset(SubsetArgs),

    /// Print the homepage view model as JSON
    Home,

    /// Load the data and print cache status and load statistics
    Status,
}

#[derive(clap::Args, Debug)]
pub struct LookupArgs {
    /// Parcel identification number, e.g. 0123456789
    pub pin: String,
}

#[derive(clap::Args, Debug)]
pub struct SubsetArgs {
    /// Bounding box as west,south,east,north in degrees; defaults to the configured bounds
    #[arg(long, allow_hyphen_values = true, conflicts_with = "all")]
    pub bbox: Option<BoundingBox>,

    /// Emit every parcel instead of filtering by bounds
    #[arg(long)]
    pub all: bool,

    /// Output file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
