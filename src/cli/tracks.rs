//! Track table commands (`qrdeck tracks ...`).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use qrdeck::{SpotifyClient, TrackOptions, prepare_tracks};

use crate::cli::common::{CatalogArgs, TrackSourceArgs};
use crate::cli::utils::{as_catalog, format_tracks, write_output};

/// Supported `qrdeck tracks` subcommands.
#[derive(Subcommand, Debug)]
pub enum TracksCommand {
    /// Import playlists into the track table without building a deck.
    Import(TracksImportArgs),
    /// Print the normalized track table.
    List(TracksListArgs),
}

/// Arguments for `qrdeck tracks import`.
#[derive(Args, Debug)]
pub struct TracksImportArgs {
    #[command(flatten)]
    pub source: TrackSourceArgs,
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// Arguments for `qrdeck tracks list`.
#[derive(Args, Debug)]
pub struct TracksListArgs {
    /// CSV file to read.
    #[arg(long, default_value = "data/tracks.csv")]
    pub csv: PathBuf,
    /// Drop repeated tracks from the listing.
    #[arg(long)]
    pub dedupe: bool,
    /// Drop explicit tracks from the listing.
    #[arg(long)]
    pub non_explicit_only: bool,
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
}

pub fn handle(cmd: TracksCommand) -> Result<()> {
    match cmd {
        TracksCommand::Import(args) => import(args),
        TracksCommand::List(args) => list(args),
    }
}

fn import(args: TracksImportArgs) -> Result<()> {
    let mut options: TrackOptions = args.source.into();
    options.write_csv = true;
    let client = SpotifyClient::from_token(args.catalog.access_token.as_deref());
    let tracks = prepare_tracks(&options, as_catalog(&client))?;
    println!("Wrote {} tracks to {}", tracks.len(), options.csv.display());
    Ok(())
}

fn list(args: TracksListArgs) -> Result<()> {
    let options = TrackOptions {
        csv: args.csv,
        dedupe: args.dedupe,
        non_explicit_only: args.non_explicit_only,
        ..TrackOptions::default()
    };
    let tracks = prepare_tracks(&options, None)?;
    write_output(&args.output, &format_tracks(&tracks))?;
    if args.output.as_os_str() != "-" {
        println!("Listed {} tracks to {}", tracks.len(), args.output.display());
    }
    Ok(())
}
