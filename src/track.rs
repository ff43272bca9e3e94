use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

const TRACK_URI_PREFIX: &str = "spotify:track:";

static TRACK_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:spotify:track:|open\.spotify\.com/track/)?([A-Za-z0-9]{22})")
        .expect("track id pattern is valid")
});

static PLAYLIST_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:spotify:playlist:|open\.spotify\.com/playlist/)([A-Za-z0-9]{22})")
        .expect("playlist id pattern is valid")
});

/// One row of the track table.
///
/// `id` holds the canonical `spotify:track:<id>` URI and is the only key used
/// for de-duplication. It is stored under the `uri` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(rename = "uri")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub explicit: bool,
}

impl TrackRecord {
    /// Build a record from a reference and the three fields printed on a card.
    pub fn new<S: Into<String>>(id: S, title: S, artist: S, year: S) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            year: year.into(),
            ..Self::default()
        }
    }

    /// Bare 22-character catalog id, if `id` carries one.
    pub fn track_id(&self) -> Option<&str> {
        extract_track_id(&self.id)
    }

    /// True when any field printed on the back of the card is blank.
    pub fn needs_metadata(&self) -> bool {
        self.title.is_empty() || self.artist.is_empty() || self.year.is_empty()
    }

    /// Copy catalog values into blank fields. The explicit flag always follows the catalog.
    pub fn fill_blanks_from(&mut self, other: &TrackRecord) {
        fill(&mut self.title, &other.title);
        fill(&mut self.artist, &other.artist);
        fill(&mut self.album, &other.album);
        fill(&mut self.release_date, &other.release_date);
        if self.year.is_empty() {
            self.year = if other.year.is_empty() {
                parse_year(&other.release_date)
            } else {
                other.year.clone()
            };
        }
        self.explicit = other.explicit;
    }
}

fn fill(target: &mut String, source: &str) {
    if target.is_empty() && !source.is_empty() {
        *target = source.to_string();
    }
}

/// Extract the 22-character id from a track URI, URL or bare id.
pub fn extract_track_id(reference: &str) -> Option<&str> {
    TRACK_ID_RE
        .captures(reference.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Canonical `spotify:track:<id>` form of a track reference.
pub fn canonical_track_uri(reference: &str) -> Option<String> {
    extract_track_id(reference).map(|id| format!("{TRACK_URI_PREFIX}{id}"))
}

/// Extract the 22-character id from a playlist URI or URL.
pub fn extract_playlist_id(reference: &str) -> Option<&str> {
    PLAYLIST_ID_RE
        .captures(reference.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Leading four-digit year of a `YYYY`, `YYYY-MM` or `YYYY-MM-DD` date.
pub fn parse_year(release_date: &str) -> String {
    let head = release_date.trim().split('-').next().unwrap_or("");
    if head.len() == 4 && head.chars().all(|c| c.is_ascii_digit()) {
        head.to_string()
    } else {
        String::new()
    }
}

/// Switches applied while normalizing a track list.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub dedupe: bool,
    pub non_explicit_only: bool,
}

/// Canonicalize ids, derive missing years, and apply the explicit and
/// duplicate filters. Input order is preserved.
pub fn normalize_tracks(tracks: Vec<TrackRecord>, options: NormalizeOptions) -> Vec<TrackRecord> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(tracks.len());
    for mut track in tracks {
        let Some(uri) = canonical_track_uri(&track.id) else {
            warn!(reference = %track.id, "skipping track with malformed identifier");
            continue;
        };
        if options.non_explicit_only && track.explicit {
            continue;
        }
        if !seen.insert(uri.clone()) && options.dedupe {
            continue;
        }
        track.id = uri;
        if track.year.is_empty() {
            track.year = parse_year(&track.release_date);
        }
        out.push(track);
    }
    out
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    ))
}
