//! Core library for QR music card decks: track tables, duplex page layout and
//! PDF output.

mod catalog;
mod config;
mod deck;
mod error;
mod identity;
mod image;
mod layout;
mod pipeline;
mod render;
mod store;
mod templates;
mod track;

pub use catalog::{LOOKUP_BATCH, SpotifyClient, TrackCatalog, fill_missing_metadata};
pub use config::{LayoutConfig, PaperSize};
pub use deck::{Card, Deck, asset_name};
pub use error::DeckError;
pub use identity::{AssetLinker, ContainerFactory, IdentityCache, IdentityResolver};
pub use crate::image::{CodeImageOptions, QUIET_ZONE_MODULES, render_code_image, save_code_image};
pub use layout::{
    BackTypography, DEFAULT_MAX_LINES, DeckLayout, FontMetrics, Grid, GridPosition, Helvetica, MM,
    Point, Rect, SheetGeometry, TITLE_MAX_LINES, encode_win_ansi, mm_to_pt, pt_to_mm,
    win_ansi_byte, wrap_lines,
};
pub use pipeline::{
    BuildOptions, BuildSummary, OutputPaths, TrackOptions, assign_targets, build_deck,
    generate_assets, prepare_tracks, write_documents,
};
pub use render::{
    PdfSheetWriter, Surface, interleave, render_back, render_deck, render_front, save_document,
    write_duplex,
};
pub use store::{read_tracks, write_tracks};
pub use templates::{PLACEHOLDER, StubTemplate};
pub use track::{
    NormalizeOptions, TrackRecord, canonical_track_uri, extract_playlist_id, extract_track_id,
    normalize_tracks, parse_year,
};
