//! # Standard Font Metrics
//!
//! Helvetica is one of the 14 standard PDF fonts: every viewer has it, so
//! watermarks need no embedded font program. Measuring text still needs
//! its advance widths, which live here (units of 1/1000 em).
//!
//! Text is written with `WinAnsiEncoding`. Characters outside that
//! encoding's Latin-1 range are replaced with `?`.

/// `BaseFont` name of the standard font.
pub const HELVETICA: &str = "Helvetica";

/// Advance widths for codes 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {..~
];

/// Width used for Latin-1 letters above 126.
const DEFAULT_WIDTH: u16 = 556;

/// Encodes `text` as single-byte WinAnsi codes.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Advance width of one encoded byte in 1/1000 em.
fn glyph_width(code: u8) -> u16 {
    match code {
        32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => DEFAULT_WIDTH,
    }
}

/// Width of `text` set in Helvetica at `font_size` points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|code| glyph_width(code) as u32)
        .sum();
    units as f32 * font_size / 1000.0
}
