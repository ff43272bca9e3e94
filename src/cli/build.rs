//! Full deck build (`qrdeck build`).

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use qrdeck::{BuildOptions, CodeImageOptions, build_deck};

use crate::cli::common::{CatalogArgs, LayoutArgs, TrackSourceArgs};
use crate::cli::utils::load_layout;

/// Arguments for `qrdeck build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub source: TrackSourceArgs,
    #[command(flatten)]
    pub catalog: CatalogArgs,
    #[command(flatten)]
    pub layout: LayoutArgs,
    /// Public base URL where cards/html is hosted.
    #[arg(long)]
    pub base_url: Option<String>,
    /// HTML template containing the SPOTIFY_TRACK_URI placeholder.
    #[arg(long)]
    pub template: Option<PathBuf>,
    /// Cache-busting tag appended as ?v= (default: derived from the deck).
    #[arg(long = "version-tag")]
    pub version_tag: Option<String>,
    /// Point each card at its own private one-track playlist.
    #[arg(long)]
    pub legacy_playlists: bool,
    /// Directory receiving cards/ and the PDFs.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,
    /// Pixel size of one code module in the PNGs.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub module_px: u32,
}

pub fn handle(args: BuildArgs) -> Result<()> {
    let options = BuildOptions {
        layout: load_layout(&args.layout)?,
        tracks: args.source.into(),
        base_url: args.base_url,
        template: args.template,
        version_tag: args.version_tag,
        legacy_playlists: args.legacy_playlists,
        access_token: args.catalog.access_token,
        out_dir: args.out_dir,
        code_image: CodeImageOptions {
            module_px: args.module_px,
            ..CodeImageOptions::default()
        },
    };
    let summary = build_deck(&options)?;
    let paths = &summary.paths;
    println!(
        "Created {} card HTML files in {} and QR PNGs in {}",
        summary.cards,
        paths.html_dir.display(),
        paths.qr_dir.display()
    );
    println!(
        "Wrote {} and {} ({} pages each, version tag {})",
        paths.front.display(),
        paths.back.display(),
        summary.pages,
        summary.version_tag
    );
    println!(
        "Created {} - front/back interleaved",
        paths.duplex.display()
    );
    Ok(())
}
