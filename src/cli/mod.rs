//! Command-line interface wiring for the `qrdeck` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! specialized submodules that encapsulate each command family.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod build;
pub mod common;
pub mod layout;
pub mod tracks;
pub mod utils;

/// Parsed CLI entrypoint for the `qrdeck` binary.
#[derive(Parser, Debug)]
#[command(name = "qrdeck", version, about = "Printable duplex QR music card decks")]
pub struct Cli {
    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// High-level command families made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build stubs, code images and the front, back and duplex PDFs.
    Build(build::BuildArgs),
    #[command(subcommand)]
    Tracks(tracks::TracksCommand),
    #[command(subcommand)]
    Layout(layout::LayoutCommand),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build(args) => build::handle(args),
        Command::Tracks(cmd) => tracks::handle(cmd),
        Command::Layout(cmd) => layout::handle(cmd),
    }
}
