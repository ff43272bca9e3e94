//! Track metadata lookups against the Spotify Web API.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::DeckError;
use crate::identity::ContainerFactory;
use crate::track::{TrackRecord, extract_playlist_id, parse_year};

const API_BASE: &str = "https://api.spotify.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Most ids the several-tracks endpoint accepts per request.
pub const LOOKUP_BATCH: usize = 50;
const PLAYLIST_PAGE: usize = 100;
const CONTAINER_PREFIX: &str = "QR_DECK_CARD_";

/// Source of track metadata.
pub trait TrackCatalog {
    /// Look up tracks by bare id. The result is positional; unknown ids are `None`.
    fn lookup_by_ids(&self, ids: &[String]) -> Result<Vec<Option<TrackRecord>>>;

    /// Tracks of a playlist in playlist order, de-duplicated, at most `limit`.
    fn lookup_playlist(&self, reference: &str, limit: Option<usize>) -> Result<Vec<TrackRecord>>;
}

#[derive(Debug, Deserialize)]
struct RawArtist {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawAlbum {
    #[serde(default)]
    name: String,
    #[serde(default)]
    release_date: String,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    artists: Vec<RawArtist>,
    #[serde(default)]
    album: Option<RawAlbum>,
    #[serde(default)]
    explicit: bool,
}

#[derive(Debug, Deserialize)]
struct TracksResponse {
    #[serde(default)]
    tracks: Vec<Option<RawTrack>>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<RawTrack>,
}

#[derive(Debug, Deserialize)]
struct PlaylistPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedPlaylist {
    id: String,
}

/// Map a catalog payload onto a record. Local files and other id-less items yield `None`.
fn track_from_raw(raw: RawTrack) -> Option<TrackRecord> {
    let id = raw.id?;
    let album = raw.album.unwrap_or_default();
    let artist = raw
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Some(TrackRecord {
        id: format!("spotify:track:{id}"),
        title: raw.name,
        artist,
        year: parse_year(&album.release_date),
        album: album.name,
        release_date: album.release_date,
        explicit: raw.explicit,
    })
}

/// Blocking client for the catalog and for legacy container creation.
pub struct SpotifyClient {
    agent: ureq::Agent,
    token: String,
    api_base: String,
    user_id: Option<String>,
}

impl SpotifyClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base(token, API_BASE)
    }

    pub fn with_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        Self {
            agent,
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            user_id: None,
        }
    }

    /// Build a client when a token is configured.
    pub fn from_token(token: Option<&str>) -> Option<Self> {
        token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Self::new)
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "catalog request");
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth())
            .call()
            .with_context(|| format!("request to {url} failed"))?;
        response
            .into_body()
            .read_json()
            .with_context(|| format!("unexpected response from {url}"))
    }

    fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        debug!(url, "catalog request");
        let response = self
            .agent
            .post(url)
            .header("Authorization", &self.auth())
            .send_json(body)
            .with_context(|| format!("request to {url} failed"))?;
        response
            .into_body()
            .read_json()
            .with_context(|| format!("unexpected response from {url}"))
    }

    fn current_user(&mut self) -> Result<String> {
        if let Some(id) = &self.user_id {
            return Ok(id.clone());
        }
        let user: CurrentUser = self.get_json(&format!("{}/me", self.api_base))?;
        self.user_id = Some(user.id.clone());
        Ok(user.id)
    }
}

impl TrackCatalog for SpotifyClient {
    fn lookup_by_ids(&self, ids: &[String]) -> Result<Vec<Option<TrackRecord>>> {
        let mut out = Vec::with_capacity(ids.len());
        for batch in ids.chunks(LOOKUP_BATCH) {
            let url = format!("{}/tracks?ids={}", self.api_base, batch.join(","));
            let response: TracksResponse = self.get_json(&url)?;
            let mut found: HashMap<String, TrackRecord> = response
                .tracks
                .into_iter()
                .flatten()
                .filter_map(track_from_raw)
                .filter_map(|t| {
                    let id = t.track_id()?.to_string();
                    Some((id, t))
                })
                .collect();
            out.extend(batch.iter().map(|id| found.remove(id)));
        }
        Ok(out)
    }

    fn lookup_playlist(&self, reference: &str, limit: Option<usize>) -> Result<Vec<TrackRecord>> {
        let id = extract_playlist_id(reference)
            .ok_or_else(|| DeckError::MalformedIdentifier(reference.to_string()))?;
        let mut next = Some(format!(
            "{}/playlists/{id}/tracks?offset=0&limit={PLAYLIST_PAGE}&additional_types=track",
            self.api_base
        ));
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        while let Some(url) = next.take() {
            let page: PlaylistPage = self.get_json(&url)?;
            if page.items.is_empty() {
                break;
            }
            for item in page.items {
                let Some(track) = item.track.and_then(track_from_raw) else {
                    continue;
                };
                if !seen.insert(track.id.clone()) {
                    continue;
                }
                out.push(track);
                if limit.is_some_and(|max| out.len() >= max) {
                    return Ok(out);
                }
            }
            next = page.next;
        }
        Ok(out)
    }
}

impl ContainerFactory for SpotifyClient {
    fn create_container(&mut self, track_id: &str) -> Result<String> {
        let user = self.current_user()?;
        let short: String = track_id.chars().take(6).collect();
        let created: CreatedPlaylist = self.post_json(
            &format!("{}/users/{user}/playlists", self.api_base),
            &json!({
                "name": format!("{CONTAINER_PREFIX}{short}"),
                "public": false,
                "description": "Single-track playlist for a printed card",
            }),
        )?;
        let _: serde_json::Value = self.post_json(
            &format!("{}/playlists/{}/tracks", self.api_base, created.id),
            &json!({ "uris": [format!("spotify:track:{track_id}")] }),
        )?;
        Ok(created.id)
    }
}

/// Fill blank title, artist and year fields from the catalog.
///
/// Returns how many records received catalog data.
pub fn fill_missing_metadata<C: TrackCatalog + ?Sized>(
    catalog: &C,
    tracks: &mut [TrackRecord],
) -> Result<usize> {
    let mut wanted: Vec<String> = Vec::new();
    for track in tracks.iter().filter(|t| t.needs_metadata()) {
        if let Some(id) = track.track_id() {
            if !wanted.iter().any(|w| w == id) {
                wanted.push(id.to_string());
            }
        }
    }
    if wanted.is_empty() {
        return Ok(0);
    }

    let mut found: HashMap<String, TrackRecord> = HashMap::new();
    for batch in wanted.chunks(LOOKUP_BATCH) {
        let results = catalog.lookup_by_ids(batch)?;
        if results.len() != batch.len() {
            return Err(anyhow!(
                "catalog answered {} of {} ids",
                results.len(),
                batch.len()
            ));
        }
        for (id, result) in batch.iter().zip(results) {
            match result {
                Some(record) => {
                    found.insert(id.clone(), record);
                }
                None => warn!(track = %id, "catalog has no entry for track"),
            }
        }
    }

    let mut filled = 0;
    for track in tracks.iter_mut() {
        let Some(record) = track.track_id().and_then(|id| found.get(id)) else {
            continue;
        };
        track.fill_blanks_from(record);
        filled += 1;
    }
    info!(requested = wanted.len(), filled, "metadata fill complete");
    Ok(filled)
}
