use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::GrayImage;
use lopdf::content::{Content, Operation};
use lopdf::xref::XrefType;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::Surface;
use crate::layout::{Helvetica, Point, Rect, encode_win_ansi};

const FONT_KEY: &str = "F1";
const PRODUCER: &str = concat!("qrdeck ", env!("CARGO_PKG_VERSION"));

/// Single-sided PDF built page by page.
pub struct PdfSheetWriter {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    media_box: Vec<Object>,
    kids: Vec<Object>,
    ops: Vec<Operation>,
    xobjects: Dictionary,
    images_on_page: usize,
}

impl PdfSheetWriter {
    pub fn new(page_width: f32, page_height: f32) -> Self {
        let mut doc = Document::with_version("1.5");
        doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Helvetica::BASE_FONT,
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_id,
            media_box: vec![0.into(), 0.into(), page_width.into(), page_height.into()],
            kids: Vec::new(),
            ops: Vec::new(),
            xobjects: Dictionary::new(),
            images_on_page: 0,
        }
    }

    /// Pages finished so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Close the page tree and return the document. A page still being drawn
    /// is finished first.
    pub fn into_document(mut self, title: &str) -> Result<Document> {
        if !self.ops.is_empty() {
            self.finish_page()?;
        }
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let stamp = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(stamp),
        });
        self.doc.trailer.set("Info", info_id);
        Ok(self.doc)
    }
}

impl Surface for PdfSheetWriter {
    fn stroke_rect(&mut self, rect: Rect, line_width: f32) {
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("G", vec![0.into()]),
            Operation::new("w", vec![line_width.into()]),
            Operation::new(
                "re",
                vec![rect.x.into(), rect.y.into(), rect.width.into(), rect.height.into()],
            ),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn draw_image(&mut self, image: &GrayImage, rect: Rect) -> Result<()> {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width() as i64,
                "Height" => image.height() as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            image.as_raw().clone(),
        );
        let image_id = self.doc.add_object(stream);
        self.images_on_page += 1;
        let name = format!("Im{}", self.images_on_page);
        self.xobjects.set(name.as_bytes().to_vec(), image_id);
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    rect.width.into(),
                    0.into(),
                    0.into(),
                    rect.height.into(),
                    rect.x.into(),
                    rect.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn draw_text(&mut self, origin: Point, size: f32, text: &str) {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_KEY.into(), size.into()]),
            Operation::new("Td", vec![origin.x.into(), origin.y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn finish_page(&mut self) -> Result<()> {
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let encoded = content.encode().context("failed to encode page content")?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));
        let resources = dictionary! {
            "Font" => dictionary! { FONT_KEY => self.font_id },
            "XObject" => std::mem::take(&mut self.xobjects),
        };
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => self.media_box.clone(),
            "Resources" => resources,
            "Contents" => content_id,
        });
        self.kids.push(page_id.into());
        self.images_on_page = 0;
        Ok(())
    }
}

/// Compress and write `doc` to `path` through a sibling temporary file, so a
/// failed write never leaves a partial document at `path`.
pub fn save_document(doc: &mut Document, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    doc.compress();
    let tmp = temp_path(path);
    let written = doc
        .save(&tmp)
        .map(|_| ())
        .with_context(|| format!("failed to write {}", tmp.display()))
        .and_then(|()| {
            fs::rename(&tmp, path)
                .with_context(|| format!("failed to move document into {}", path.display()))
        });
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
