//! End-to-end deck build: track table to stubs, code images and PDFs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use image::GrayImage;
use tracing::{info, warn};

use crate::catalog::{SpotifyClient, TrackCatalog, fill_missing_metadata};
use crate::config::LayoutConfig;
use crate::deck::Deck;
use crate::error::DeckError;
use crate::identity::{AssetLinker, ContainerFactory, IdentityCache, IdentityResolver};
use crate::image::{CodeImageOptions, render_code_image, save_code_image};
use crate::layout::{DeckLayout, Helvetica};
use crate::render::{PdfSheetWriter, render_deck, save_document, write_duplex};
use crate::store::{read_tracks, write_tracks};
use crate::templates::StubTemplate;
use crate::track::{NormalizeOptions, TrackRecord, extract_playlist_id, normalize_tracks};

/// Length of the fingerprint prefix used as the default version tag.
const DEFAULT_TAG_LEN: usize = 8;

/// Where the track list comes from and how it is cleaned up.
#[derive(Debug, Clone, Default)]
pub struct TrackOptions {
    pub csv: PathBuf,
    pub write_csv: bool,
    pub playlists: Vec<String>,
    /// Per-playlist cap.
    pub limit: Option<usize>,
    pub dedupe: bool,
    pub non_explicit_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub tracks: TrackOptions,
    pub base_url: Option<String>,
    pub template: Option<PathBuf>,
    /// Cache-busting tag; derived from the deck when absent.
    pub version_tag: Option<String>,
    /// Point each stub at a cached one-track playlist instead of the track.
    pub legacy_playlists: bool,
    pub access_token: Option<String>,
    pub out_dir: PathBuf,
    pub layout: LayoutConfig,
    pub code_image: CodeImageOptions,
}

/// Output locations under an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub html_dir: PathBuf,
    pub qr_dir: PathBuf,
    pub front: PathBuf,
    pub back: PathBuf,
    pub duplex: PathBuf,
    pub identity_cache: PathBuf,
}

impl OutputPaths {
    pub fn under(root: &Path) -> Self {
        let cards = root.join("cards");
        Self {
            html_dir: cards.join("html"),
            qr_dir: cards.join("qrcodes"),
            front: root.join("deck_front.pdf"),
            back: root.join("deck_back.pdf"),
            duplex: root.join("deck_duplex.pdf"),
            identity_cache: root.join("playlist_cache.json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub cards: usize,
    pub pages: usize,
    pub version_tag: String,
    pub paths: OutputPaths,
}

/// Load, import, normalize and optionally fill the track list.
///
/// Playlist import needs `catalog`; without one it fails with
/// [`DeckError::ExternalLookupUnavailable`]. A metadata fill without a
/// catalog is skipped with a warning.
pub fn prepare_tracks(
    options: &TrackOptions,
    catalog: Option<&dyn TrackCatalog>,
) -> Result<Vec<TrackRecord>> {
    let mut tracks = read_tracks(&options.csv)?;
    info!(count = tracks.len(), path = %options.csv.display(), "loaded track table");

    if !options.playlists.is_empty() {
        let catalog = catalog.ok_or_else(|| {
            DeckError::ExternalLookupUnavailable(
                "playlist import needs a catalog access token".to_string(),
            )
        })?;
        for reference in &options.playlists {
            if extract_playlist_id(reference).is_none() {
                warn!("{}", DeckError::MalformedIdentifier(reference.clone()));
                continue;
            }
            let fetched = catalog
                .lookup_playlist(reference, options.limit)
                .with_context(|| format!("failed to import playlist {reference}"))?;
            info!(count = fetched.len(), playlist = %reference, "imported playlist");
            tracks.extend(fetched);
        }
    }

    let normalize = NormalizeOptions {
        dedupe: options.dedupe,
        non_explicit_only: options.non_explicit_only,
    };
    let mut tracks = normalize_tracks(tracks, normalize);

    if tracks.iter().any(TrackRecord::needs_metadata) {
        match catalog {
            Some(catalog) => {
                fill_missing_metadata(catalog, &mut tracks)?;
                if options.non_explicit_only {
                    tracks.retain(|t| !t.explicit);
                }
            }
            None => warn!("skipping metadata fill: no catalog access token configured"),
        }
    }

    if options.write_csv {
        write_tracks(&options.csv, &tracks)?;
        info!(count = tracks.len(), path = %options.csv.display(), "wrote track table");
    }
    Ok(tracks)
}

/// Pair each track with the URI its stub opens, creating legacy containers as needed.
pub fn assign_targets<F: ContainerFactory>(
    tracks: Vec<TrackRecord>,
    resolver: &mut IdentityResolver<F>,
) -> Result<Deck> {
    let mut entries = Vec::with_capacity(tracks.len());
    for track in tracks {
        if let Some(container) = resolver.resolve(&track.id)? {
            entries.push((track, format!("spotify:playlist:{container}")));
        }
    }
    Ok(Deck::from_targets(entries))
}

/// Write each card's HTML stub and PNG code image; return the images in card order.
pub fn generate_assets(
    deck: &Deck,
    template: &StubTemplate,
    linker: &AssetLinker,
    paths: &OutputPaths,
    image_options: &CodeImageOptions,
) -> Result<Vec<GrayImage>> {
    for dir in [&paths.html_dir, &paths.qr_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    let mut images = Vec::with_capacity(deck.len());
    for card in deck.cards() {
        let html_path = paths.html_dir.join(format!("{}.html", card.asset_name));
        fs::write(&html_path, template.render(&card.stub_target))
            .with_context(|| format!("failed to write {}", html_path.display()))?;

        let url = linker.code_url(&card.asset_name);
        let image = render_code_image(&url, image_options)?;
        save_code_image(&image, &paths.qr_dir.join(format!("{}.png", card.asset_name)))?;
        images.push(image);
    }
    Ok(images)
}

/// Render front and back documents, then the interleaved duplex document.
///
/// Returns the page count of each single-sided document.
pub fn write_documents(
    deck: &Deck,
    layout: &DeckLayout,
    images: &[GrayImage],
    paths: &OutputPaths,
) -> Result<usize> {
    if !layout.sheet.fits(layout.grid) {
        warn!(
            cols = layout.grid.cols(),
            rows = layout.grid.rows(),
            "grid extends past the page edge"
        );
    }
    let (width, height) = (layout.sheet.page_width, layout.sheet.page_height);
    let mut front = PdfSheetWriter::new(width, height);
    let mut back = PdfSheetWriter::new(width, height);
    let pages = render_deck(deck, layout, &Helvetica, images, &mut front, &mut back)?;

    let mut front_doc = front.into_document("Card fronts")?;
    let mut back_doc = back.into_document("Card backs")?;
    save_document(&mut front_doc, &paths.front)?;
    save_document(&mut back_doc, &paths.back)?;
    write_duplex(&paths.front, &paths.back, &paths.duplex)?;
    Ok(pages)
}

/// Run the whole build.
pub fn build_deck(options: &BuildOptions) -> Result<BuildSummary> {
    let layout = options.layout.resolve()?;
    let template = StubTemplate::resolve(options.template.as_deref())?;

    let client = SpotifyClient::from_token(options.access_token.as_deref());
    if client.is_none() && options.legacy_playlists {
        return Err(DeckError::ExternalLookupUnavailable(
            "legacy playlists need a catalog access token".to_string(),
        )
        .into());
    }
    let tracks = prepare_tracks(
        &options.tracks,
        client.as_ref().map(|c| c as &dyn TrackCatalog),
    )?;
    if tracks.is_empty() {
        return Err(anyhow!(
            "no tracks to build; add rows to {} or pass playlists",
            options.tracks.csv.display()
        ));
    }

    let paths = OutputPaths::under(&options.out_dir);
    let deck = match client {
        Some(client) if options.legacy_playlists => {
            let cache = IdentityCache::load(&paths.identity_cache)?;
            let mut resolver = IdentityResolver::new(cache, client);
            assign_targets(tracks, &mut resolver)?
        }
        _ => Deck::from_tracks(tracks),
    };

    let version_tag = match &options.version_tag {
        Some(tag) => tag.clone(),
        None => deck.fingerprint()[..DEFAULT_TAG_LEN].to_string(),
    };
    let linker = AssetLinker::new(options.base_url.clone(), version_tag.clone());

    let images = generate_assets(&deck, &template, &linker, &paths, &options.code_image)?;
    let pages = write_documents(&deck, &layout, &images, &paths)?;
    info!(cards = deck.len(), pages, "deck complete");

    Ok(BuildSummary {
        cards: deck.len(),
        pages,
        version_tag,
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct StaticCatalog {
        playlist: Vec<TrackRecord>,
    }

    impl TrackCatalog for StaticCatalog {
        fn lookup_by_ids(&self, ids: &[String]) -> Result<Vec<Option<TrackRecord>>> {
            Ok(ids
                .iter()
                .map(|id| {
                    let mut t = TrackRecord::new(
                        format!("spotify:track:{id}"),
                        "Filled".to_string(),
                        "Catalog".to_string(),
                        String::new(),
                    );
                    t.release_date = "1977-05-25".into();
                    t.explicit = true;
                    Some(t)
                })
                .collect())
        }

        fn lookup_playlist(&self, _: &str, limit: Option<usize>) -> Result<Vec<TrackRecord>> {
            let n = limit.unwrap_or(self.playlist.len()).min(self.playlist.len());
            Ok(self.playlist[..n].to_vec())
        }
    }

    const A: &str = "3KkXRkHbMCARz0aVfEt68P";
    const B: &str = "5Z01UMMf7V1o0MzF86s6WJ";

    fn options(dir: &Path) -> TrackOptions {
        TrackOptions {
            csv: dir.join("tracks.csv"),
            dedupe: true,
            ..TrackOptions::default()
        }
    }

    #[test]
    fn playlists_without_catalog_are_unavailable() {
        let dir = TempDir::new().unwrap();
        let mut opts = options(dir.path());
        opts.playlists = vec![format!("spotify:playlist:{A}")];
        let err = prepare_tracks(&opts, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeckError>(),
            Some(DeckError::ExternalLookupUnavailable(_))
        ));
    }

    #[test]
    fn incomplete_rows_are_kept_when_fill_is_skipped() {
        let dir = TempDir::new().unwrap();
        let opts = options(dir.path());
        write_tracks(&opts.csv, &[TrackRecord::new(A, "", "", "")]).unwrap();
        let tracks = prepare_tracks(&opts, None).unwrap();
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].needs_metadata());
    }

    #[test]
    fn import_fill_and_filter_then_write_back() {
        let dir = TempDir::new().unwrap();
        let mut opts = options(dir.path());
        opts.playlists = vec![
            format!("https://open.spotify.com/playlist/{A}"),
            "not a playlist".to_string(),
        ];
        opts.limit = Some(1);
        opts.write_csv = true;
        opts.non_explicit_only = true;
        write_tracks(
            &opts.csv,
            &[
                TrackRecord::new(B, "", "", ""),
                TrackRecord::new(A, "Kept", "Local", "2018"),
            ],
        )
        .unwrap();
        let catalog = StaticCatalog {
            playlist: vec![
                TrackRecord::new(format!("spotify:track:{A}"), "Dup".into(), "X".into(), "2000".into()),
                TrackRecord::new(format!("spotify:track:{B}"), "Never".into(), "X".into(), "2000".into()),
            ],
        };

        let tracks = prepare_tracks(&opts, Some(&catalog)).unwrap();
        // B is filled, becomes explicit and is dropped; the playlist copy of A is a duplicate.
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "Kept");
        assert_eq!(read_tracks(&opts.csv).unwrap(), tracks);
    }

    #[derive(Default)]
    struct SequentialFactory {
        created: Vec<String>,
    }

    impl ContainerFactory for SequentialFactory {
        fn create_container(&mut self, track_id: &str) -> Result<String> {
            self.created.push(track_id.to_string());
            Ok(format!("{:0>22}", self.created.len()))
        }
    }

    #[test]
    fn legacy_targets_point_at_containers() {
        let dir = TempDir::new().unwrap();
        let cache = IdentityCache::load(&dir.path().join("playlist_cache.json")).unwrap();
        let mut resolver = IdentityResolver::new(cache, SequentialFactory::default());
        let tracks = vec![
            TrackRecord::new(format!("spotify:track:{A}"), "a".into(), "a".into(), "1".into()),
            TrackRecord::new("spotify:track:bogus".to_string(), "b".into(), "b".into(), "2".into()),
            TrackRecord::new(format!("spotify:track:{A}"), "a".into(), "a".into(), "1".into()),
        ];
        let deck = assign_targets(tracks, &mut resolver).unwrap();
        assert_eq!(deck.len(), 2);
        let expected = format!("spotify:playlist:{:0>22}", 1);
        assert_eq!(deck.cards()[0].stub_target, expected);
        assert_eq!(deck.cards()[1].stub_target, expected);
        assert_eq!(deck.cards()[1].asset_name, "track0002");
    }

    #[test]
    fn assets_are_named_by_card_index() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::under(dir.path());
        let deck = Deck::from_tracks(vec![
            TrackRecord::new(format!("spotify:track:{A}"), "a".into(), "a".into(), "1".into()),
            TrackRecord::new(format!("spotify:track:{B}"), "b".into(), "b".into(), "2".into()),
        ]);
        let linker = AssetLinker::new(Some("https://cards.example/".into()), "t1");
        let images = generate_assets(
            &deck,
            &StubTemplate::builtin(),
            &linker,
            &paths,
            &CodeImageOptions::default(),
        )
        .unwrap();
        assert_eq!(images.len(), 2);
        let html = fs::read_to_string(paths.html_dir.join("track0002.html")).unwrap();
        assert!(html.contains(&format!("spotify:track:{B}")));
        assert!(paths.qr_dir.join("track0001.png").exists());
        assert!(paths.qr_dir.join("track0002.png").exists());
    }
}
