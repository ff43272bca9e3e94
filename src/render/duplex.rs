use std::path::Path;

use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId, dictionary};
use tracing::info;

use super::save_document;
use crate::error::DeckError;

/// Page attributes a page may inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Merge two single-sided documents into `[f1, b1, f2, b2, ...]`.
///
/// Fails with [`DeckError::PageCountMismatch`] unless both have the same
/// number of pages.
pub fn interleave(mut front: Document, mut back: Document) -> Result<Document> {
    let front_count = front.get_pages().len();
    let back_count = back.get_pages().len();
    if front_count != back_count {
        return Err(DeckError::PageCountMismatch {
            front: front_count,
            back: back_count,
        }
        .into());
    }

    flatten_inherited(&mut front)?;
    flatten_inherited(&mut back)?;

    back.renumber_objects_with(front.max_id + 1);
    let front_pages: Vec<ObjectId> = front.get_pages().into_values().collect();
    let back_pages: Vec<ObjectId> = back.get_pages().into_values().collect();

    front.max_id = front.max_id.max(back.max_id);
    front.objects.extend(back.objects);

    let pages_id = front.new_object_id();
    let mut kids = Vec::with_capacity(front_pages.len() * 2);
    for (f, b) in front_pages.iter().zip(&back_pages) {
        kids.push(Object::Reference(*f));
        kids.push(Object::Reference(*b));
    }
    for page in front_pages.iter().chain(&back_pages) {
        front
            .get_object_mut(*page)
            .and_then(Object::as_dict_mut)?
            .set("Parent", pages_id);
    }
    let count = kids.len() as i64;
    front.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = front.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    front.trailer.set("Root", catalog_id);

    front.prune_objects();
    front.renumber_objects();
    Ok(front)
}

/// Copy inherited attributes onto each page so it survives re-parenting.
fn flatten_inherited(doc: &mut Document) -> Result<()> {
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in pages {
        let mut found: Vec<(&[u8], Object)> = Vec::new();
        let page = doc.get_dictionary(page_id)?;
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut missing: Vec<&[u8]> = INHERITABLE
            .iter()
            .copied()
            .filter(|key| !page.has(key))
            .collect();
        while let Some(node_id) = parent {
            if missing.is_empty() {
                break;
            }
            let node = doc.get_dictionary(node_id)?;
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    found.push((*key, value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
        if found.is_empty() {
            continue;
        }
        let page = doc.get_object_mut(page_id).and_then(Object::as_dict_mut)?;
        for (key, value) in found {
            page.set(key.to_vec(), value);
        }
    }
    Ok(())
}

/// Interleave the documents at `front` and `back` into `out`.
///
/// Nothing is written when the inputs cannot be paired.
pub fn write_duplex(front: &Path, back: &Path, out: &Path) -> Result<usize> {
    let front_doc = Document::load(front)
        .with_context(|| format!("failed to read {}", front.display()))?;
    let back_doc =
        Document::load(back).with_context(|| format!("failed to read {}", back.display()))?;
    let mut merged = interleave(front_doc, back_doc)?;
    let pages = merged.get_pages().len();
    save_document(&mut merged, out)?;
    info!(pages, path = %out.display(), "wrote duplex document");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;
    use crate::render::{PdfSheetWriter, Surface};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn marked(prefix: &str, pages: usize) -> Document {
        let mut writer = PdfSheetWriter::new(612.0, 792.0);
        for n in 1..=pages {
            writer.draw_text(Point { x: 10.0, y: 10.0 }, 12.0, &format!("{prefix}{n}"));
            writer.finish_page().unwrap();
        }
        writer.into_document(prefix).unwrap()
    }

    fn page_markers(doc: &Document) -> Vec<String> {
        doc.get_pages()
            .into_values()
            .map(|id| {
                let content = doc.get_page_content(id).unwrap();
                let text = String::from_utf8_lossy(&content);
                let start = text.find('(').unwrap() + 1;
                let end = text[start..].find(')').unwrap() + start;
                text[start..end].to_string()
            })
            .collect()
    }

    #[test]
    fn pages_alternate_front_and_back() {
        let merged = interleave(marked("F", 3), marked("B", 3)).unwrap();
        assert_eq!(page_markers(&merged), vec!["F1", "B1", "F2", "B2", "F3", "B3"]);
        for id in merged.get_pages().into_values() {
            let page = merged.get_dictionary(id).unwrap();
            assert!(page.has(b"MediaBox"));
            assert!(page.has(b"Resources"));
        }
    }

    #[test]
    fn inherited_media_box_is_copied_to_pages() {
        let mut front = marked("F", 1);
        let page_id = *front.get_pages().values().next().unwrap();
        let media_box = front
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .remove(b"MediaBox")
            .unwrap();
        let root = front.catalog().unwrap().get(b"Pages").unwrap().as_reference().unwrap();
        front
            .get_object_mut(root)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("MediaBox", media_box);

        let merged = interleave(front, marked("B", 1)).unwrap();
        for id in merged.get_pages().into_values() {
            assert!(merged.get_dictionary(id).unwrap().has(b"MediaBox"));
        }
    }

    #[test]
    fn mismatched_page_counts_write_nothing() {
        let dir = TempDir::new().unwrap();
        let front = dir.path().join("front.pdf");
        let back = dir.path().join("back.pdf");
        let out = dir.path().join("duplex.pdf");
        save_document(&mut marked("F", 2), &front).unwrap();
        save_document(&mut marked("B", 1), &back).unwrap();

        let err = write_duplex(&front, &back, &out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeckError>(),
            Some(DeckError::PageCountMismatch { front: 2, back: 1 })
        ));
        assert!(!out.exists());
    }

    #[test]
    fn files_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let front = dir.path().join("front.pdf");
        let back = dir.path().join("back.pdf");
        let out = dir.path().join("duplex.pdf");
        save_document(&mut marked("F", 2), &front).unwrap();
        save_document(&mut marked("B", 2), &back).unwrap();

        assert_eq!(write_duplex(&front, &back, &out).unwrap(), 4);
        let merged = Document::load(&out).unwrap();
        assert_eq!(page_markers(&merged), vec!["F1", "B1", "F2", "B2"]);
    }
}
