//! Stable per-card identities: asset URLs and cached external containers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::error::DeckError;
use crate::track::extract_track_id;

/// Builds the URL encoded into each card's code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLinker {
    base_url: Option<String>,
    version_tag: String,
}

impl AssetLinker {
    pub fn new(base_url: Option<String>, version_tag: impl Into<String>) -> Self {
        let base_url = base_url.filter(|url| !url.trim().is_empty());
        Self {
            base_url,
            version_tag: version_tag.into(),
        }
    }

    pub fn version_tag(&self) -> &str {
        &self.version_tag
    }

    /// `{base}{asset}.html?v={tag}`, or the bare `{asset}.html` without a base.
    pub fn code_url(&self, asset_name: &str) -> String {
        let Some(base) = &self.base_url else {
            return format!("{asset_name}.html");
        };
        let url = format!("{base}{asset_name}.html");
        if self.version_tag.is_empty() {
            return url;
        }
        let sep = if url.contains('?') { '&' } else { '?' };
        format!("{url}{sep}v={}", self.version_tag)
    }
}

/// Persistent `track id -> container id` mapping.
#[derive(Debug, Clone, Default)]
pub struct IdentityCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl IdentityCache {
    /// Load the mapping at `path`; a missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let data = fs::read_to_string(path)
                .with_context(|| format!("failed to read identity cache {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("failed to parse identity cache {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, track_id: &str) -> Option<&str> {
        self.entries.get(track_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, track_id: String, container_id: String) {
        self.entries.insert(track_id, container_id);
    }

    /// Rewrite the whole mapping file through a sibling temporary file, so a
    /// failed flush leaves the previous mapping intact.
    pub fn save(&self) -> Result<()> {
        let fail = |source: std::io::Error| DeckError::CacheWriteFailure {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(fail)?;
            }
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.temp_path();
        let written = fs::write(&tmp, data).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(fail(err).into());
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        self.path.with_file_name(name)
    }
}

/// Creates the external container a legacy card points at.
pub trait ContainerFactory {
    /// Create a container holding `track_id` and return its id.
    fn create_container(&mut self, track_id: &str) -> Result<String>;
}

/// Resolves track references to containers, creating each at most once.
pub struct IdentityResolver<F> {
    cache: IdentityCache,
    factory: F,
}

impl<F: ContainerFactory> IdentityResolver<F> {
    pub fn new(cache: IdentityCache, factory: F) -> Self {
        Self { cache, factory }
    }

    /// Container id for `reference`. `None` when the reference is malformed.
    ///
    /// A new entry is flushed to disk before returning.
    pub fn resolve(&mut self, reference: &str) -> Result<Option<String>> {
        let Some(track_id) = extract_track_id(reference) else {
            warn!(
                "{}",
                DeckError::MalformedIdentifier(reference.to_string())
            );
            return Ok(None);
        };
        if let Some(existing) = self.cache.get(track_id) {
            return Ok(Some(existing.to_string()));
        }
        let container = self
            .factory
            .create_container(track_id)
            .with_context(|| format!("failed to create container for track {track_id}"))?;
        info!(track = track_id, container = %container, "created container");
        self.cache.insert(track_id.to_string(), container.clone());
        self.cache.save()?;
        Ok(Some(container))
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    pub fn into_cache(self) -> IdentityCache {
        self.cache
    }
}
