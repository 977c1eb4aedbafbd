//! # PDF Watermark Overlay
//!
//! Stamps text or an image onto selected pages of an existing PDF.
//!
//! ## Per-Page Edit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Page dictionary                                                        │
//! │                                                                         │
//! │  /Contents [ (q) , original streams... , (Q + overlay) ]                │
//! │               │                              │                          │
//! │               │  isolates the original       │  q /QtWmGs gs            │
//! │               │  graphics state              │    rotate+translate cm   │
//! │               ▼                              │    BT .. Tj ET  or  Do   │
//! │                                              │  Q                       │
//! │  /Resources  (page-local copy of inherited resources)                   │
//! │     /Font     << /QtWmFont  Helvetica >>                                │
//! │     /ExtGState<< /QtWmGs    ca/CA = opacity >>                          │
//! │     /XObject  << /QtWmImg   RGB image + DeviceGray SMask >>             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shared objects (font, graphics state, image) are added once and
//! referenced from every marked page.

use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use quicktools_core::watermark::{resolve_pages, Placement, Size, WatermarkContent, WatermarkSpec};
use quicktools_core::ValidationError;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult};
use crate::fonts::{encode_win_ansi, text_width, HELVETICA};

const FONT_RESOURCE: &str = "QtWmFont";
const GS_RESOURCE: &str = "QtWmGs";
const IMAGE_RESOURCE: &str = "QtWmImg";

/// Used when neither the page nor its ancestors carry a MediaBox (A4).
const FALLBACK_PAGE: Size = Size {
    width: 595.0,
    height: 842.0,
};

/// A watermarked document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkOutput {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// 1-based numbers of the marked pages.
    pub pages_marked: Vec<u32>,
    pub page_count: u32,
}

/// What the overlay draws, after shared objects are in the document.
enum Mark {
    Text {
        text: Vec<u8>,
        font_size: f32,
        color: (f32, f32, f32),
        size: Size,
    },
    Image {
        scale: f32,
        aspect: f32,
    },
}

// =============================================================================
// Entry Point
// =============================================================================

/// Applies `spec` to `pdf` and returns the re-serialized document.
pub fn apply_watermark(pdf: &[u8], spec: &WatermarkSpec) -> RenderResult<WatermarkOutput> {
    spec.validate()?;

    let mut doc = Document::load_mem(pdf)?;
    if doc.is_encrypted() {
        return Err(RenderError::Pdf("encrypted PDFs are not supported".to_string()));
    }

    let pages = doc.get_pages();
    let page_count = pages.len() as u32;
    let targets: Vec<(u32, ObjectId)> = resolve_pages(&spec.pages, pages.len())?
        .into_iter()
        .filter_map(|index| {
            let number = index as u32 + 1;
            pages.get(&number).map(|id| (number, *id))
        })
        .collect();

    if targets.is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "pages".to_string(),
            reason: format!("no selected page exists in a {page_count}-page document"),
        }
        .into());
    }

    let gs_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => spec.opacity,
        "CA" => spec.opacity,
    });

    let (mark, shared) = match &spec.content {
        WatermarkContent::Text {
            text,
            font_size,
            color,
        } => {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => HELVETICA,
                "Encoding" => "WinAnsiEncoding",
            });
            let mark = Mark::Text {
                text: encode_win_ansi(text),
                font_size: *font_size,
                color: color.to_unit(),
                size: Size::new(text_width(text, *font_size), *font_size),
            };
            (mark, (b"Font".as_slice(), FONT_RESOURCE, font_id))
        }
        WatermarkContent::Image { data, scale } => {
            let rgba = image::load_from_memory(data)?.to_rgba8();
            let aspect = rgba.height() as f32 / rgba.width().max(1) as f32;
            let image_id = embed_image(&mut doc, &rgba)?;
            let mark = Mark::Image {
                scale: *scale,
                aspect,
            };
            (mark, (b"XObject".as_slice(), IMAGE_RESOURCE, image_id))
        }
    };

    for (number, page_id) in &targets {
        let (origin, page) = page_box(&doc, *page_id);
        let size = match &mark {
            Mark::Text { size, .. } => *size,
            Mark::Image { scale, aspect } => {
                let width = page.width * scale;
                Size::new(width, width * aspect)
            }
        };

        let mut placement = spec.placement(page, size);
        placement.x += origin.0;
        placement.y += origin.1;

        let mut resources = page_resources(&doc, *page_id);
        add_resource(&doc, &mut resources, b"ExtGState", GS_RESOURCE, gs_id);
        add_resource(&doc, &mut resources, shared.0, shared.1, shared.2);

        let overlay = overlay_content(&mark, size, placement)?;
        append_overlay(&mut doc, *page_id, overlay)?;
        page_dict_mut(&mut doc, *page_id)?.set("Resources", resources);

        debug!(page = *number, x = placement.x, y = placement.y, "Marked page");
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    let pages_marked: Vec<u32> = targets.iter().map(|(number, _)| *number).collect();
    info!(
        marked = pages_marked.len(),
        page_count,
        bytes = bytes.len(),
        "Applied watermark"
    );

    Ok(WatermarkOutput {
        bytes,
        pages_marked,
        page_count,
    })
}

// =============================================================================
// Drawing
// =============================================================================

/// Content stream that draws the mark in its own graphics state.
fn overlay_content(mark: &Mark, size: Size, placement: Placement) -> RenderResult<Vec<u8>> {
    let (sin, cos) = placement.rotation_degrees.to_radians().sin_cos();

    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![Object::Name(GS_RESOURCE.as_bytes().to_vec())]),
        Operation::new(
            "cm",
            vec![
                cos.into(),
                sin.into(),
                (-sin).into(),
                cos.into(),
                placement.x.into(),
                placement.y.into(),
            ],
        ),
    ];

    match mark {
        Mark::Text {
            text,
            font_size,
            color,
            ..
        } => {
            operations.extend([
                Operation::new("rg", vec![color.0.into(), color.1.into(), color.2.into()]),
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![
                        Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                        (*font_size).into(),
                    ],
                ),
                Operation::new("Td", vec![0.into(), 0.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(text.clone(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ]);
        }
        Mark::Image { .. } => {
            operations.extend([
                Operation::new(
                    "cm",
                    vec![
                        size.width.into(),
                        0.into(),
                        0.into(),
                        size.height.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new(
                    "Do",
                    vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())],
                ),
            ]);
        }
    }
    operations.push(Operation::new("Q", vec![]));

    Ok(Content { operations }.encode()?)
}

/// Embeds an RGBA image as a Flate RGB XObject with a DeviceGray SMask.
fn embed_image(doc: &mut Document, rgba: &RgbaImage) -> RenderResult<ObjectId> {
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut smask = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        alpha,
    );
    smask.compress()?;
    let smask_id = doc.add_object(smask);

    let mut image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "SMask" => smask_id,
        },
        rgb,
    );
    image.compress()?;

    Ok(doc.add_object(image))
}

// =============================================================================
// Page Plumbing
// =============================================================================

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> RenderResult<&mut Dictionary> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| RenderError::Pdf(format!("page {page_id:?} is not a dictionary")))
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).and_then(Object::as_dict).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Looks `key` up on the page, then on its ancestors (inheritable keys).
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict = doc.get_object(id).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Page-local copy of the effective resources.
fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    inherited(doc, page_id, b"Resources")
        .and_then(|obj| resolve_dict(doc, obj))
        .cloned()
        .unwrap_or_default()
}

/// Adds `/category << /name id >>`, copying an indirect subdictionary so
/// shared resource objects are never modified.
fn add_resource(doc: &Document, resources: &mut Dictionary, category: &[u8], name: &str, id: ObjectId) {
    let mut entries = resources
        .get(category)
        .ok()
        .and_then(|obj| resolve_dict(doc, obj))
        .cloned()
        .unwrap_or_default();
    entries.set(name, id);
    resources.set(category, entries);
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}

/// Lower-left corner and size of the page's MediaBox.
fn page_box(doc: &Document, page_id: ObjectId) -> ((f32, f32), Size) {
    let media_box = inherited(doc, page_id, b"MediaBox").and_then(|obj| match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    });

    let corners = media_box
        .and_then(|obj| obj.as_array().ok())
        .filter(|arr| arr.len() == 4)
        .and_then(|arr| {
            Some((
                number(&arr[0])?,
                number(&arr[1])?,
                number(&arr[2])?,
                number(&arr[3])?,
            ))
        });

    match corners {
        Some((llx, lly, urx, ury)) => ((llx, lly), Size::new(urx - llx, ury - lly)),
        None => ((0.0, 0.0), FALLBACK_PAGE),
    }
}

/// Wraps the existing content in `q`/`Q` and appends `overlay`.
fn append_overlay(doc: &mut Document, page_id: ObjectId, overlay: Vec<u8>) -> RenderResult<()> {
    let existing: Vec<Object> = {
        let page = doc.get_object(page_id).and_then(Object::as_dict)?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    let mut stream = Vec::with_capacity(overlay.len() + 2);
    if !existing.is_empty() {
        let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(open));
        contents.extend(existing);
        stream.extend_from_slice(b"Q\n");
    }
    stream.extend(overlay);

    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), stream));
    contents.push(Object::Reference(overlay_id));
    page_dict_mut(doc, page_id)?.set("Contents", contents);

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
