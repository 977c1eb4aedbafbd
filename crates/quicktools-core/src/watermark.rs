//! # Watermark Module
//!
//! Page selection and placement math for PDF watermarks. Parsing and
//! writing the PDF happen in `quicktools-render`; everything here works on
//! page counts and sizes only.
//!
//! ## Coordinate System
//! ```text
//!   (0, height) ┌────────────────────────────┐ (width, height)
//!               │ TopLeft            TopRight│
//!               │                            │
//!               │          Center            │
//!               │        ╱ Diagonal          │
//!               │                            │
//!               │BottomLeft       BottomRight│
//!         (0, 0)└────────────────────────────┘ (width, 0)
//! ```
//!
//! PDF user space: origin bottom-left, y grows upward, units are points.
//! A [`Placement`] is the lower-left corner of the unrotated mark plus
//! the rotation applied around that corner.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Rgb;
use crate::validation::{require, validate_max_len, validate_range, validate_unit_interval, ValidationResult};

/// Distance kept between a corner mark and the page edge, in points.
pub const DEFAULT_MARGIN: f32 = 50.0;

pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 200.0;
pub const MAX_TEXT_LEN: usize = 200;

/// Rotation used by [`WatermarkPosition::Diagonal`].
pub const DIAGONAL_DEGREES: f32 = 45.0;

pub const DEFAULT_FONT_SIZE: f32 = 48.0;
pub const DEFAULT_OPACITY: f32 = 0.3;
/// Mark width as a fraction of the page width.
pub const DEFAULT_IMAGE_SCALE: f32 = 0.5;
pub const DEFAULT_TEXT_COLOR: Rgb = Rgb {
    r: 128,
    g: 128,
    b: 128,
};

// =============================================================================
// Page Selection
// =============================================================================

/// Which pages get the watermark.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "pages", rename_all = "snake_case")]
pub enum PageSelection {
    #[default]
    All,
    First,
    Last,
    /// 1-based pages and ranges, e.g. `"1,3,5-8,10"`.
    Custom(String),
}

/// Resolves a selection to sorted, deduplicated, 0-based page indices.
///
/// Pages past `page_count` are dropped silently; a malformed token is an
/// error.
///
/// ## Example
/// ```rust
/// use quicktools_core::watermark::{resolve_pages, PageSelection};
///
/// let custom = PageSelection::Custom("1,3,5-8,10".into());
/// assert_eq!(resolve_pages(&custom, 7).unwrap(), vec![0, 2, 4, 5, 6]);
/// assert_eq!(resolve_pages(&PageSelection::Last, 7).unwrap(), vec![6]);
/// ```
pub fn resolve_pages(selection: &PageSelection, page_count: usize) -> ValidationResult<Vec<usize>> {
    if page_count == 0 {
        return Ok(Vec::new());
    }

    let pages = match selection {
        PageSelection::All => (0..page_count).collect(),
        PageSelection::First => vec![0],
        PageSelection::Last => vec![page_count - 1],
        PageSelection::Custom(spec) => parse_custom_pages(spec, page_count)?,
    };

    Ok(pages)
}

fn parse_custom_pages(spec: &str, page_count: usize) -> ValidationResult<Vec<usize>> {
    let spec = require("pages", spec)?;
    let mut pages = Vec::new();

    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (start, end) = match token.split_once('-') {
            Some((start, end)) => (parse_page_number(start)?, parse_page_number(end)?),
            None => {
                let page = parse_page_number(token)?;
                (page, page)
            }
        };

        if start > end {
            return Err(ValidationError::invalid_format(
                "pages",
                format!("range '{token}' runs backwards"),
            ));
        }

        // 1-based, inclusive; clamp so huge ranges stay cheap
        pages.extend((start..=end.min(page_count)).map(|p| p - 1));
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

fn parse_page_number(token: &str) -> ValidationResult<usize> {
    let token = token.trim();
    match token.parse::<usize>() {
        Ok(0) => Err(ValidationError::invalid_format(
            "pages",
            "pages are numbered from 1",
        )),
        Ok(page) => Ok(page),
        Err(_) => Err(ValidationError::invalid_format(
            "pages",
            format!("'{token}' is not a page number"),
        )),
    }
}

// =============================================================================
// Placement
// =============================================================================

/// Named anchor for the watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Diagonal,
}

/// Width and height in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Size { width, height }
    }
}

/// Where to draw the mark: lower-left corner and rotation around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub rotation_degrees: f32,
}

impl Placement {
    /// Placement whose rotated mark is centered on `center`.
    fn centered_on(center: (f32, f32), mark: Size, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (hw, hh) = (mark.width / 2.0, mark.height / 2.0);
        // Mark center relative to its lower-left corner after rotation.
        let (cx, cy) = (hw * cos - hh * sin, hw * sin + hh * cos);
        Placement {
            x: center.0 - cx,
            y: center.1 - cy,
            rotation_degrees: degrees,
        }
    }

    /// Turns the mark by `degrees` around its own center.
    pub fn rotated(self, mark: Size, degrees: f32) -> Self {
        if degrees == 0.0 {
            return self;
        }
        let center = (self.x + mark.width / 2.0, self.y + mark.height / 2.0);
        Placement::centered_on(center, mark, self.rotation_degrees + degrees)
    }
}

/// Computes where a `mark` goes on a `page`.
///
/// ## Example
/// ```rust
/// use quicktools_core::watermark::{compute_placement, Size, WatermarkPosition};
///
/// let page = Size::new(612.0, 792.0);
/// let mark = Size::new(100.0, 20.0);
/// let p = compute_placement(WatermarkPosition::TopRight, page, mark, 50.0);
/// assert_eq!((p.x, p.y), (462.0, 722.0));
/// ```
pub fn compute_placement(position: WatermarkPosition, page: Size, mark: Size, margin: f32) -> Placement {
    let right = page.width - mark.width - margin;
    let top = page.height - mark.height - margin;

    let at = |x: f32, y: f32| Placement {
        x,
        y,
        rotation_degrees: 0.0,
    };

    match position {
        WatermarkPosition::Center => at(
            (page.width - mark.width) / 2.0,
            (page.height - mark.height) / 2.0,
        ),
        WatermarkPosition::TopLeft => at(margin, top),
        WatermarkPosition::TopRight => at(right, top),
        WatermarkPosition::BottomLeft => at(margin, margin),
        WatermarkPosition::BottomRight => at(right, margin),
        WatermarkPosition::Diagonal => Placement::centered_on(
            (page.width / 2.0, page.height / 2.0),
            mark,
            DIAGONAL_DEGREES,
        ),
    }
}

// =============================================================================
// Watermark Spec
// =============================================================================

/// What gets stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatermarkContent {
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        font_size: f32,
        color: Rgb,
    },
    /// Encoded PNG or JPEG bytes; `scale` is the mark width as a fraction
    /// of the page width.
    Image { data: Vec<u8>, scale: f32 },
}

/// A complete watermark request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkSpec {
    pub content: WatermarkContent,
    pub opacity: f32,
    /// Extra rotation in degrees, around the mark's center.
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub position: WatermarkPosition,
    #[serde(default)]
    pub pages: PageSelection,
}

impl WatermarkSpec {
    pub fn text(text: impl Into<String>) -> Self {
        WatermarkSpec {
            content: WatermarkContent::Text {
                text: text.into(),
                font_size: DEFAULT_FONT_SIZE,
                color: DEFAULT_TEXT_COLOR,
            },
            opacity: DEFAULT_OPACITY,
            rotation: 0.0,
            position: WatermarkPosition::default(),
            pages: PageSelection::default(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_unit_interval("opacity", self.opacity)?;
        if !self.rotation.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "rotation".to_string(),
            });
        }
        validate_range("rotation", self.rotation as i64, -360, 360)?;

        match &self.content {
            WatermarkContent::Text { text, font_size, .. } => {
                require("text", text)?;
                validate_max_len("text", text, MAX_TEXT_LEN)?;
                if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(font_size) {
                    return Err(ValidationError::OutOfRange {
                        field: "fontSize".to_string(),
                        min: MIN_FONT_SIZE as i64,
                        max: MAX_FONT_SIZE as i64,
                    });
                }
            }
            WatermarkContent::Image { data, scale } => {
                if data.is_empty() {
                    return Err(ValidationError::Required {
                        field: "image".to_string(),
                    });
                }
                if !(*scale > 0.0 && *scale <= 1.0) {
                    return Err(ValidationError::invalid_format(
                        "scale",
                        "must be greater than 0 and at most 1",
                    ));
                }
            }
        }

        if let PageSelection::Custom(spec) = &self.pages {
            require("pages", spec)?;
        }
        Ok(())
    }

    /// Final placement on a page, including the extra rotation.
    pub fn placement(&self, page: Size, mark: Size) -> Placement {
        compute_placement(self.position, page, mark, DEFAULT_MARGIN).rotated(mark, self.rotation)
    }
}

/// Output name for a watermarked copy of `original`.
///
/// ## Example
/// ```rust
/// use quicktools_core::watermark::watermarked_filename;
///
/// assert_eq!(watermarked_filename("report.pdf"), "report-watermarked.pdf");
/// assert_eq!(watermarked_filename("/tmp/q3.final.pdf"), "q3.final-watermarked.pdf");
/// ```
pub fn watermarked_filename(original: &str) -> String {
    let name = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    let stem = if stem.trim().is_empty() { "document" } else { stem };
    format!("{stem}-watermarked.pdf")
}

// =============================================================================
// Unit Tests
// =============================================================================
