//! # QR Content Module
//!
//! Builds the exact string a QR code encodes from a content type and a
//! bag of form fields, plus the geometry and style used when rendering.
//! Matrix encoding itself is done by `quicktools-render`.
//!
//! ## Payload Formats
//! ```text
//! ┌──────────┬──────────────────────────────────────────────────────────────┐
//! │ text     │ raw text                                                     │
//! │ url      │ raw URL, https:// prepended when no scheme                   │
//! │ phone    │ tel:<number>                                                 │
//! │ email    │ mailto:<addr>?subject=<enc>&body=<enc>                       │
//! │ sms      │ sms:<number>?body=<enc>                                      │
//! │ wifi     │ WIFI:S:<ssid>;T:WPA;P:<password>;;                           │
//! │ event    │ BEGIN:VEVENT ... END:VEVENT (UTC timestamps)                 │
//! │ contact  │ BEGIN:VCARD / VERSION:3.0 ... END:VCARD                      │
//! │ payment  │ upi://pay?pa=..&pn=..&am=..&cu=..&tn=..                      │
//! │ image    │ data:image/jpeg;base64,...                                   │
//! └──────────┴──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `<enc>` is URI component percent-encoding.
//!
//! The WiFi security type is always `WPA`. Open and WEP networks are not
//! expressible.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::types::Rgb;
use crate::validation::{parse_finite, require_opt, validate_range, ValidationResult};

/// Largest share of the QR image a logo may cover, in percent.
pub const MAX_LOGO_PERCENT: u32 = 25;

pub const MIN_QR_SIZE: u32 = 100;
pub const MAX_QR_SIZE: u32 = 1000;
pub const DEFAULT_QR_SIZE: u32 = 300;

/// Currency used by UPI payment payloads when none is given.
pub const DEFAULT_CURRENCY: &str = "INR";

const ICAL_TIMESTAMP: &str = "%Y%m%dT%H%M%SZ";

// =============================================================================
// Content Types
// =============================================================================

/// What the QR code carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QrContentType {
    Text,
    Url,
    Phone,
    Email,
    Sms,
    Wifi,
    Event,
    Contact,
    Payment,
    Image,
}

/// Form fields. Each content type reads the fields it needs and ignores
/// the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct QrFields {
    pub text: Option<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub ssid: Option<String>,
    pub password: Option<String>,
    pub title: Option<String>,
    /// RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]` taken as UTC.
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub payee: Option<String>,
    pub payee_name: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub note: Option<String>,
    /// Data URL produced by `quicktools-render`'s image preparation.
    pub image_data_url: Option<String>,
}

/// Trimmed, non-blank optional field.
fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn encode(value: Option<&str>) -> String {
    urlencoding::encode(value.unwrap_or_default()).into_owned()
}

// =============================================================================
// Payload Builder
// =============================================================================

/// Builds the string to encode for `kind`.
///
/// ## Example
/// ```rust
/// use quicktools_core::qr::{build_payload, QrContentType, QrFields};
///
/// let fields = QrFields {
///     ssid: Some("Home".into()),
///     password: Some("hunter2".into()),
///     ..Default::default()
/// };
/// assert_eq!(
///     build_payload(QrContentType::Wifi, &fields).unwrap(),
///     "WIFI:S:Home;T:WPA;P:hunter2;;"
/// );
/// ```
pub fn build_payload(kind: QrContentType, fields: &QrFields) -> CoreResult<String> {
    let payload = match kind {
        QrContentType::Text => {
            // Text is encoded verbatim, surrounding whitespace included.
            require_opt("text", fields.text.as_deref())?;
            fields.text.clone().unwrap_or_default()
        }
        QrContentType::Url => normalize_url(require_opt("url", fields.url.as_deref())?),
        QrContentType::Phone => format!("tel:{}", require_opt("phone", fields.phone.as_deref())?),
        QrContentType::Email => format!(
            "mailto:{}?subject={}&body={}",
            require_opt("email", fields.email.as_deref())?,
            encode(optional(&fields.subject)),
            encode(optional(&fields.body)),
        ),
        QrContentType::Sms => format!(
            "sms:{}?body={}",
            require_opt("phone", fields.phone.as_deref())?,
            encode(optional(&fields.body)),
        ),
        QrContentType::Wifi => format!(
            "WIFI:S:{};T:WPA;P:{};;",
            require_opt("ssid", fields.ssid.as_deref())?,
            fields.password.as_deref().unwrap_or_default(),
        ),
        QrContentType::Event => build_event(fields)?,
        QrContentType::Contact => build_contact(fields)?,
        QrContentType::Payment => build_payment(fields)?,
        QrContentType::Image => {
            let data_url = require_opt("image", fields.image_data_url.as_deref())?;
            if !data_url.starts_with("data:image/") {
                return Err(
                    ValidationError::invalid_format("image", "expected an image data URL").into(),
                );
            }
            data_url.to_string()
        }
    };

    Ok(payload)
}

/// Schemes written without `//` after the colon.
const OPAQUE_SCHEMES: [&str; 3] = ["mailto", "tel", "sms"];

/// Prepends `https://` when the URL has no scheme.
///
/// Only the part before the first `/`, `?` or `#` is looked at, so a URL
/// carried in a query string does not count.
///
/// ## Example
/// ```rust
/// use quicktools_core::qr::normalize_url;
///
/// assert_eq!(normalize_url("ftp://files.example.com"), "ftp://files.example.com");
/// assert_eq!(normalize_url("example.com/?next=https://x"), "https://example.com/?next=https://x");
/// assert_eq!(normalize_url("localhost:8080"), "https://localhost:8080");
/// ```
pub fn normalize_url(url: &str) -> String {
    if has_scheme(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn has_scheme(url: &str) -> bool {
    let head = url.split(['/', '?', '#']).next().unwrap_or_default();
    let Some((scheme, _)) = head.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return false;
    }

    url[scheme.len()..].starts_with("://")
        || OPAQUE_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme))
}

fn build_event(fields: &QrFields) -> CoreResult<String> {
    let title = require_opt("title", fields.title.as_deref())?;
    let start = parse_event_time("start", require_opt("start", fields.start.as_deref())?)?;
    let end = optional(&fields.end)
        .map(|end| parse_event_time("end", end))
        .transpose()?;

    if matches!(end, Some(end) if end < start) {
        return Err(ValidationError::invalid_format("end", "must not be before start").into());
    }

    let mut lines = vec![
        "BEGIN:VEVENT".to_string(),
        format!("SUMMARY:{title}"),
        format!("DTSTART:{}", start.format(ICAL_TIMESTAMP)),
    ];
    if let Some(end) = end {
        lines.push(format!("DTEND:{}", end.format(ICAL_TIMESTAMP)));
    }
    if let Some(location) = optional(&fields.location) {
        lines.push(format!("LOCATION:{location}"));
    }
    lines.push("END:VEVENT".to_string());

    Ok(lines.join("\n"))
}

/// Parses an event time; offsets are converted to UTC, naive times are
/// taken as UTC.
pub fn parse_event_time(field: &str, text: &str) -> ValidationResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::invalid_format(field, "expected YYYY-MM-DDTHH:MM"))
}

fn build_contact(fields: &QrFields) -> CoreResult<String> {
    let name = require_opt("name", fields.name.as_deref())?;

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{name}"),
    ];
    for (key, value) in [
        ("TEL", &fields.phone),
        ("EMAIL", &fields.email),
        ("ORG", &fields.organization),
    ] {
        if let Some(value) = optional(value) {
            lines.push(format!("{key}:{value}"));
        }
    }
    lines.push("END:VCARD".to_string());

    Ok(lines.join("\n"))
}

fn build_payment(fields: &QrFields) -> CoreResult<String> {
    let payee = require_opt("payee", fields.payee.as_deref())?;

    // A VPA (`name@bank`) goes in unencoded.
    let mut params = vec![format!("pa={payee}")];
    if let Some(name) = optional(&fields.payee_name) {
        params.push(format!("pn={}", urlencoding::encode(name)));
    }
    if let Some(amount) = optional(&fields.amount) {
        let value = parse_finite("amount", amount)?;
        if value <= 0.0 {
            return Err(ValidationError::invalid_format("amount", "must be positive").into());
        }
        params.push(format!("am={amount}"));
    }
    let currency = optional(&fields.currency).unwrap_or(DEFAULT_CURRENCY);
    params.push(format!("cu={}", urlencoding::encode(currency)));
    if let Some(note) = optional(&fields.note) {
        params.push(format!("tn={}", urlencoding::encode(note)));
    }

    Ok(format!("upi://pay?{}", params.join("&")))
}

// =============================================================================
// Style
// =============================================================================

/// Reed-Solomon error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EcLevel {
    /// ~7% recovery
    Low,
    /// ~15% recovery
    #[default]
    Medium,
    /// ~25% recovery
    Quartile,
    /// ~30% recovery
    High,
}

/// Rendering options for a QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct QrStyle {
    /// Output width and height in pixels.
    pub size: u32,
    #[ts(as = "String")]
    pub dark_color: Rgb,
    #[ts(as = "String")]
    pub light_color: Rgb,
    pub error_correction: EcLevel,
    pub quiet_zone: bool,
    /// Logo size as a percent of `size`; capped at [`MAX_LOGO_PERCENT`].
    pub logo_percent: u32,
}

impl Default for QrStyle {
    fn default() -> Self {
        QrStyle {
            size: DEFAULT_QR_SIZE,
            dark_color: Rgb::BLACK,
            light_color: Rgb::WHITE,
            error_correction: EcLevel::default(),
            quiet_zone: true,
            logo_percent: 20,
        }
    }
}

impl QrStyle {
    pub fn with_size(size: u32) -> Self {
        QrStyle {
            size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_range(
            "size",
            self.size as i64,
            MIN_QR_SIZE as i64,
            MAX_QR_SIZE as i64,
        )?;
        validate_range("logoPercent", self.logo_percent as i64, 0, 100)?;
        if self.dark_color == self.light_color {
            return Err(ValidationError::invalid_format(
                "darkColor",
                "must differ from lightColor",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Logo Plate
// =============================================================================

/// Where a logo and its white backing plate go on a square QR image.
///
/// ```text
///   ┌──────────────────────────┐
///   │ ▓▓▓ ▓ ▓▓   ▓▓ ▓  ▓▓▓▓ ▓  │
///   │ ▓  ╭────────────╮ ▓  ▓▓  │
///   │ ▓▓ │  ┌──────┐  │  ▓▓ ▓  │  plate = logo + 2 × padding,
///   │  ▓ │  │ logo │  │ ▓ ▓▓   │  rounded corners,
///   │ ▓▓ │  └──────┘  │  ▓  ▓  │  both centered
///   │ ▓  ╰────────────╯ ▓▓▓ ▓  │
///   │ ▓▓▓  ▓ ▓▓ ▓   ▓▓  ▓▓▓▓▓  │
///   └──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LogoPlate {
    pub logo_size: u32,
    pub logo_offset: u32,
    pub plate_size: u32,
    pub plate_offset: u32,
    pub corner_radius: u32,
}

impl LogoPlate {
    /// Computes the plate for a `qr_px` square image. `logo_percent` is
    /// capped at [`MAX_LOGO_PERCENT`].
    ///
    /// ## Example
    /// ```rust
    /// use quicktools_core::qr::LogoPlate;
    ///
    /// let plate = LogoPlate::compute(300, 20);
    /// assert_eq!(plate.logo_size, 60);
    /// assert_eq!(plate.logo_offset, 120);
    /// assert_eq!(LogoPlate::compute(300, 80), LogoPlate::compute(300, 25));
    /// ```
    pub fn compute(qr_px: u32, logo_percent: u32) -> Self {
        let percent = logo_percent.min(MAX_LOGO_PERCENT);
        let logo_size = qr_px * percent / 100;
        let padding = (logo_size / 10).max(2);
        let plate_size = (logo_size + 2 * padding).min(qr_px);

        LogoPlate {
            logo_size,
            logo_offset: (qr_px - logo_size) / 2,
            plate_size,
            plate_offset: (qr_px - plate_size) / 2,
            corner_radius: padding * 2,
        }
    }

    /// Whether pixel `(x, y)` lies on the rounded plate.
    pub fn covers(&self, x: u32, y: u32) -> bool {
        let (lo, hi) = (self.plate_offset, self.plate_offset + self.plate_size);
        if x < lo || y < lo || x >= hi || y >= hi {
            return false;
        }

        let r = self.corner_radius.min(self.plate_size / 2) as i64;
        let (x, y, lo, hi) = (x as i64, y as i64, lo as i64, hi as i64 - 1);
        // Distance past the nearest corner circle center, zero on straight edges.
        let dx = (lo + r - x).max(x - (hi - r)).max(0);
        let dy = (lo + r - y).max(y - (hi - r)).max(0);
        dx * dx + dy * dy <= r * r
    }
}

/// Download name for a rendered QR code.
pub fn qr_download_filename(at: DateTime<Utc>) -> String {
    format!("qrcode-{}.png", at.timestamp_millis())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;
    use chrono::TimeZone;

    fn fields() -> QrFields {
        QrFields::default()
    }

    #[test]
    fn test_text_and_phone() {
        let f = QrFields {
            text: Some(" hello ".into()),
            phone: Some("+15551234".into()),
            ..fields()
        };
        assert_eq!(build_payload(QrContentType::Text, &f).unwrap(), " hello ");
        assert_eq!(
            build_payload(QrContentType::Phone, &f).unwrap(),
            "tel:+15551234"
        );
    }

    #[test]
    fn test_url_scheme_is_added_once() {
        let mut f = QrFields {
            url: Some("example.com/a".into()),
            ..fields()
        };
        assert_eq!(
            build_payload(QrContentType::Url, &f).unwrap(),
            "https://example.com/a"
        );
        f.url = Some("http://example.com".into());
        assert_eq!(
            build_payload(QrContentType::Url, &f).unwrap(),
            "http://example.com"
        );
    }

    #[test]
    fn test_url_scheme_only_counts_before_path() {
        assert_eq!(
            normalize_url("example.com/?next=https://x"),
            "https://example.com/?next=https://x"
        );
        assert_eq!(normalize_url("example.com#https://x"), "https://example.com#https://x");
        assert_eq!(normalize_url("localhost:8080/app"), "https://localhost:8080/app");
        assert_eq!(normalize_url("1http://x"), "https://1http://x");
        assert_eq!(normalize_url("HTTPS://Example.com"), "HTTPS://Example.com");
        assert_eq!(normalize_url("mailto:ada@example.com"), "mailto:ada@example.com");
        assert_eq!(normalize_url("tel:+15551234"), "tel:+15551234");
    }

    #[test]
    fn test_email_encodes_components() {
        let f = QrFields {
            email: Some("a@b.co".into()),
            subject: Some("Hi there".into()),
            body: Some("x&y=z".into()),
            ..fields()
        };
        assert_eq!(
            build_payload(QrContentType::Email, &f).unwrap(),
            "mailto:a@b.co?subject=Hi%20there&body=x%26y%3Dz"
        );
    }

    #[test]
    fn test_sms() {
        let f = QrFields {
            phone: Some("555".into()),
            body: Some("on my way".into()),
            ..fields()
        };
        assert_eq!(
            build_payload(QrContentType::Sms, &f).unwrap(),
            "sms:555?body=on%20my%20way"
        );
    }

    #[test]
    fn test_wifi_is_always_wpa() {
        let f = QrFields {
            ssid: Some("Cafe".into()),
            ..fields()
        };
        assert_eq!(
            build_payload(QrContentType::Wifi, &f).unwrap(),
            "WIFI:S:Cafe;T:WPA;P:;;"
        );
    }

    #[test]
    fn test_event_block() {
        let f = QrFields {
            title: Some("Launch".into()),
            start: Some("2024-03-05T09:30:00+02:00".into()),
            end: Some("2024-03-05T10:00".into()),
            location: Some("HQ".into()),
            ..fields()
        };
        assert_eq!(
            build_payload(QrContentType::Event, &f).unwrap(),
            "BEGIN:VEVENT\nSUMMARY:Launch\nDTSTART:20240305T073000Z\nDTEND:20240305T100000Z\nLOCATION:HQ\nEND:VEVENT"
        );
    }

    #[test]
    fn test_event_rejects_bad_times() {
        let f = QrFields {
            title: Some("Launch".into()),
            start: Some("next tuesday".into()),
            ..fields()
        };
        assert!(build_payload(QrContentType::Event, &f).is_err());

        let f = QrFields {
            title: Some("Launch".into()),
            start: Some("2024-03-05T10:00".into()),
            end: Some("2024-03-05T09:00".into()),
            ..fields()
        };
        assert!(build_payload(QrContentType::Event, &f).is_err());
    }

    #[test]
    fn test_contact_vcard() {
        let f = QrFields {
            name: Some("Ada Lovelace".into()),
            email: Some("ada@example.com".into()),
            ..fields()
        };
        assert_eq!(
            build_payload(QrContentType::Contact, &f).unwrap(),
            "BEGIN:VCARD\nVERSION:3.0\nFN:Ada Lovelace\nEMAIL:ada@example.com\nEND:VCARD"
        );
    }

    #[test]
    fn test_payment_uri() {
        let f = QrFields {
            payee: Some("shop@upi".into()),
            payee_name: Some("Corner Shop".into()),
            amount: Some("149.50".into()),
            note: Some("Order 7".into()),
            ..fields()
        };
        assert_eq!(
            build_payload(QrContentType::Payment, &f).unwrap(),
            "upi://pay?pa=shop@upi&pn=Corner%20Shop&am=149.50&cu=INR&tn=Order%207"
        );
        assert!(!build_payload(QrContentType::Payment, &f).unwrap().contains("%40"));

        let f = QrFields {
            payee: Some("shop@upi".into()),
            amount: Some("-3".into()),
            ..fields()
        };
        assert!(build_payload(QrContentType::Payment, &f).is_err());
    }

    #[test]
    fn test_image_requires_data_url() {
        let f = QrFields {
            image_data_url: Some("https://example.com/cat.jpg".into()),
            ..fields()
        };
        assert!(build_payload(QrContentType::Image, &f).is_err());

        let f = QrFields {
            image_data_url: Some("data:image/jpeg;base64,AAAA".into()),
            ..fields()
        };
        assert!(build_payload(QrContentType::Image, &f).is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        for kind in [
            QrContentType::Text,
            QrContentType::Url,
            QrContentType::Phone,
            QrContentType::Email,
            QrContentType::Sms,
            QrContentType::Wifi,
            QrContentType::Event,
            QrContentType::Contact,
            QrContentType::Payment,
            QrContentType::Image,
        ] {
            assert!(
                matches!(
                    build_payload(kind, &fields()),
                    Err(CoreError::Validation(ValidationError::Required { .. }))
                ),
                "{kind:?} accepted empty fields"
            );
        }
    }

    #[test]
    fn test_logo_plate_is_centered_and_capped() {
        let plate = LogoPlate::compute(400, 50);
        assert_eq!(plate.logo_size, 100);
        assert_eq!(plate.plate_size, 120);
        assert_eq!(plate.plate_offset, 140);
        assert_eq!(plate.logo_offset * 2 + plate.logo_size, 400);
    }

    #[test]
    fn test_logo_plate_corners_are_rounded() {
        let plate = LogoPlate::compute(400, 25);
        let lo = plate.plate_offset;
        let hi = lo + plate.plate_size - 1;
        assert!(!plate.covers(lo, lo));
        assert!(!plate.covers(hi, hi));
        assert!(plate.covers(200, 200));
        assert!(plate.covers(lo, 200));
        assert!(!plate.covers(lo - 1, 200));
    }

    #[test]
    fn test_style_validation() {
        assert!(QrStyle::default().validate().is_ok());
        assert!(QrStyle::with_size(99).validate().is_err());
        assert!(QrStyle::with_size(1001).validate().is_err());

        let style = QrStyle {
            light_color: Rgb::BLACK,
            ..Default::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_style_accepts_partial_json() {
        let style: QrStyle =
            serde_json::from_str(r##"{"size": 512, "darkColor": "#336699"}"##).unwrap();
        assert_eq!(style.size, 512);
        assert_eq!(style.dark_color, Rgb { r: 0x33, g: 0x66, b: 0x99 });
        assert_eq!(style.light_color, Rgb::WHITE);
    }

    #[test]
    fn test_download_filename() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(qr_download_filename(at), "qrcode-1700000000123.png");
    }
}
