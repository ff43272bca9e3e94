//! Shared clap helper types for CLI commands.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use qrdeck::{PaperSize, TrackOptions};

/// Paper sizes accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PaperSizeArg {
    Letter,
    A4,
}

impl From<PaperSizeArg> for PaperSize {
    fn from(value: PaperSizeArg) -> PaperSize {
        match value {
            PaperSizeArg::Letter => PaperSize::Letter,
            PaperSizeArg::A4 => PaperSize::A4,
        }
    }
}

/// Track table and playlist import flags.
#[derive(Args, Debug, Clone)]
pub struct TrackSourceArgs {
    /// CSV file to read tracks from (and write back with --write-csv).
    #[arg(long, default_value = "data/tracks.csv")]
    pub csv: PathBuf,
    /// Write the combined track list back to --csv.
    #[arg(long)]
    pub write_csv: bool,
    /// Spotify playlist URLs or URIs to import.
    #[arg(long, num_args = 1..)]
    pub playlists: Vec<String>,
    /// Max tracks imported per playlist.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,
    /// Drop repeated tracks.
    #[arg(long)]
    pub dedupe: bool,
    /// Drop explicit tracks.
    #[arg(long)]
    pub non_explicit_only: bool,
}

impl From<TrackSourceArgs> for TrackOptions {
    fn from(args: TrackSourceArgs) -> TrackOptions {
        TrackOptions {
            csv: args.csv,
            write_csv: args.write_csv,
            playlists: args.playlists,
            limit: args.limit.map(|n| n as usize),
            dedupe: args.dedupe,
            non_explicit_only: args.non_explicit_only,
        }
    }
}

/// Catalog credentials.
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Bearer token for the Spotify Web API.
    #[arg(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

/// Page geometry flags.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// TOML layout profile.
    #[arg(long = "layout")]
    pub profile: Option<PathBuf>,
    /// Override the profile's paper size.
    #[arg(long, value_enum)]
    pub paper: Option<PaperSizeArg>,
    /// Vertical back-face correction in millimetres.
    #[arg(long, allow_negative_numbers = true)]
    pub y_shift_mm: Option<f32>,
}
