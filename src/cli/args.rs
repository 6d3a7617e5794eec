use crate::extractor::orientation::SideMapping;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "leaf_histogram")]
#[command(about = "Write intensity histograms of grayscale JPEGs into every leaf directory")]
#[command(version)]
pub struct Cli {
    /// Root directory to scan
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Maximum number of images processed at the same time
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Timeout in seconds for each extraction step of a single image
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Images with more distinct colors than this are left out of the manifest
    #[arg(long, default_value = "256")]
    pub max_colors: usize,

    /// Which half of the image maps to "left"
    #[arg(long, value_enum, default_value_t = SideMapping::Direct)]
    pub side_mapping: SideMapping,

    /// Do not render histogram charts
    #[arg(long)]
    pub no_charts: bool,

    /// Suppress per-file progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
}
