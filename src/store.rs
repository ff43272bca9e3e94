//! Flat CSV table of track records.
//!
//! Column order is fixed: `uri,title,artist,year,album,release_date,explicit`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::track::TrackRecord;

/// Read every row of the table. A missing file is an empty list.
pub fn read_tracks(path: &Path) -> Result<Vec<TrackRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .with_context(|| format!("failed to open track table {}", path.display()))?;
    let mut tracks = Vec::new();
    for (idx, row) in reader.deserialize::<TrackRecord>().enumerate() {
        let track = row.with_context(|| {
            format!("failed to parse row {} of {}", idx + 2, path.display())
        })?;
        tracks.push(track);
    }
    Ok(tracks)
}

/// Overwrite the table with `tracks`, creating parent directories as needed.
pub fn write_tracks(path: &Path, tracks: &[TrackRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to write track table {}", path.display()))?;
    for track in tracks {
        writer
            .serialize(track)
            .with_context(|| format!("failed to serialize track {}", track.id))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush track table {}", path.display()))?;
    Ok(())
}
