//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use qrdeck::{LayoutConfig, TrackCatalog, TrackRecord, pt_to_mm};

use crate::cli::common::LayoutArgs;

/// Resolve the layout profile and apply command-line overrides.
pub fn load_layout(args: &LayoutArgs) -> Result<LayoutConfig> {
    let mut config = match &args.profile {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(paper) = args.paper {
        config.paper = paper.into();
    }
    if let Some(shift) = args.y_shift_mm {
        config.y_shift_mm = shift;
    }
    config.validate()?;
    Ok(config)
}

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Points rendered as millimetres with one decimal.
pub fn mm(pt: f32) -> String {
    format!("{:.1}", pt_to_mm(pt))
}

/// Tab-separated listing of a track table.
pub fn format_tracks(tracks: &[TrackRecord]) -> String {
    let mut out = String::new();
    for (idx, track) in tracks.iter().enumerate() {
        let flag = if track.explicit { " [E]" } else { "" };
        out.push_str(&format!(
            "{:>4}\t{}\t{}\t{}\t{}{}\n",
            idx + 1,
            track.id,
            display_or_dash(&track.year),
            display_or_dash(&track.title),
            display_or_dash(&track.artist),
            flag
        ));
    }
    out
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Borrow an optional client as a catalog trait object.
pub fn as_catalog<C: TrackCatalog>(client: &Option<C>) -> Option<&dyn TrackCatalog> {
    client.as_ref().map(|c| c as &dyn TrackCatalog)
}
