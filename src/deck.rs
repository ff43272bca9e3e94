use sha2::{Digest, Sha256};

use crate::layout::{Grid, GridPosition};
use crate::track::TrackRecord;

/// Deterministic asset name for the card at zero-based `index`.
pub fn asset_name(index: usize) -> String {
    format!("track{:04}", index + 1)
}

/// One physical two-sided card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub index: usize,
    pub track: TrackRecord,
    /// Names the card's HTML stub and code image.
    pub asset_name: String,
    /// URI substituted into the stub template.
    pub stub_target: String,
}

/// Ordered, immutable set of cards produced by one run.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Number the tracks in input order. The stub of each card points at the
    /// track's own URI.
    pub fn from_tracks(tracks: Vec<TrackRecord>) -> Self {
        Self::from_targets(
            tracks
                .into_iter()
                .map(|track| {
                    let target = track.id.clone();
                    (track, target)
                })
                .collect(),
        )
    }

    /// Number `(track, stub target)` pairs in input order.
    pub fn from_targets(entries: Vec<(TrackRecord, String)>) -> Self {
        let cards = entries
            .into_iter()
            .enumerate()
            .map(|(index, (track, stub_target))| Card {
                index,
                asset_name: asset_name(index),
                track,
                stub_target,
            })
            .collect();
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards grouped by page; the last group may be short.
    pub fn pages(&self, grid: Grid) -> std::slice::Chunks<'_, Card> {
        self.cards.chunks(grid.cells_per_page())
    }

    pub fn position(&self, card: &Card, grid: Grid) -> GridPosition {
        grid.position(card.index)
    }

    /// SHA-256 over the ordered track ids.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for card in &self.cards {
            hasher.update(card.track.id.as_bytes());
            hasher.update(b"\n");
        }
        let digest = hasher.finalize();
        format!("{digest:x}")
    }
}
