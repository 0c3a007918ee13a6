use std::path::PathBuf;

use clap::Parser;

/// Finds which candidate clip in a directory best matches a query recording.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Audio or video file to match (.wav, .mp3, .mov, .mp4, .avi, .flv, .mkv)
    pub query: PathBuf,

    /// Directory to scan recursively for candidate .wav files
    pub candidates: PathBuf,

    /// Directory the result CSV is written into
    #[arg(short, long, default_value = "results")]
    pub output: PathBuf,

    /// Only fingerprint these channel indices from the query (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub channels: Option<Vec<usize>>,

    /// Average all query channels into one before matching
    #[arg(short, long, default_value_t = false)]
    pub force_mono: bool,

    /// Worker thread count for scoring candidates; default is the rayon global pool size
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
