//! Normalization of heterogeneous backend hoarding documents
//!
//! The backend corpus accumulated inconsistent field names over time
//! (multiple authors, ad-hoc schema). Everything downstream of this module
//! operates on one canonical [`HoardingRecord`] shape; the functions here are
//! total over arbitrary input and never fail, so a single malformed document
//! cannot break the rendering of an entire category.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Recognized availability field names, in precedence order. The first
/// present (non-null) field wins regardless of what later aliases hold.
const AVAILABILITY_ALIASES: [&str; 6] = [
    "available",
    "Available",
    "availability",
    "Availability",
    "isAvailable",
    "is_available",
];

/// Recognized image field names, in precedence order.
const IMAGE_ALIASES: [&str; 8] = [
    "image",
    "imageUrl",
    "imageURL",
    "Image",
    "photo",
    "img",
    "picture",
    "thumbnail",
];

const LAT_ALIASES: [&str; 4] = ["lat", "latitude", "Lat", "Latitude"];
const LNG_ALIASES: [&str; 6] = ["lng", "longitude", "long", "Lng", "Longitude", "Long"];

/// Canonical field names; raw fields under these names are superseded by the
/// normalized values and excluded from the pass-through bag.
const CANONICAL_FIELDS: [&str; 12] = [
    "id",
    "title",
    "location",
    "categoryName",
    "lat",
    "lng",
    "price",
    "image",
    "imageUrl",
    "size",
    "available",
    "expiryDate",
];

/// A hoarding document in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoardingRecord {
    /// Backend document identifier, assigned at fetch time
    pub id: String,

    /// Display label (title, else location, else name, else the category name)
    pub title: String,

    /// Free-text address string; empty if absent
    pub location: String,

    /// The category this record was fetched under; assigned by the caller
    #[serde(rename = "categoryName")]
    pub category_name: String,

    /// Latitude; `None` when absent or non-numeric, never defaulted to 0
    pub lat: Option<f64>,

    /// Longitude; `None` when absent or non-numeric, never defaulted to 0
    pub lng: Option<f64>,

    /// Monthly price; non-negative, 0 when absent or non-numeric
    pub price: f64,

    /// Resolved image URL or public id; empty if no recognized field matched
    pub image: String,

    /// Same value as `image`, kept under the legacy alias for downstream code
    #[serde(rename = "imageUrl")]
    pub image_url: String,

    /// Free-text dimension string, e.g. "20x10"; empty if absent
    pub size: String,

    /// Availability, resolved through the alias scan
    pub available: bool,

    /// Expiry date, passed through unmodified except for backend-timestamp
    /// unwrapping
    #[serde(rename = "expiryDate", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<Value>,

    /// All original document fields not covered by a canonical slot
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Look up a field, treating JSON null the same as an absent field.
fn present<'a>(doc: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    doc.get(key).filter(|v| !v.is_null())
}

fn string_field(doc: &Map<String, Value>, key: &str) -> Option<String> {
    match present(doc, key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Resolve the availability flag from whichever recognized field is present.
///
/// Coercions for the matched value: booleans pass through; strings are
/// trimmed and lowercased, true iff "true", "yes" or "1"; numbers are true
/// iff exactly 1. A recognized alias holding any other type still stops the
/// scan and yields `false`, keeping the result deterministic. No recognized
/// field at all yields `false`.
pub fn normalize_availability(doc: &Map<String, Value>) -> bool {
    for alias in AVAILABILITY_ALIASES {
        if let Some(value) = present(doc, alias) {
            return match value {
                Value::Bool(b) => *b,
                Value::String(s) => {
                    matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1")
                }
                Value::Number(n) => n.as_f64() == Some(1.0),
                // Present but not a coercible type: counts as found-but-false.
                _ => false,
            };
        }
    }
    false
}

/// Resolve the image URL from whichever recognized field holds a string.
///
/// Unlike the availability scan, non-string values under a recognized alias
/// are skipped in favor of the next alias; returns an empty string when
/// nothing matches.
pub fn normalize_image(doc: &Map<String, Value>) -> String {
    for alias in IMAGE_ALIASES {
        if let Some(Value::String(s)) = present(doc, alias) {
            return s.clone();
        }
    }
    String::new()
}

/// First present coordinate alias, parsed as a finite float.
fn scan_coordinate(doc: &Map<String, Value>, aliases: &[&str]) -> Option<f64> {
    for &alias in aliases {
        if let Some(value) = present(doc, alias) {
            let parsed = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            // A present field that fails to parse yields None, not a scan of
            // the remaining aliases: the document named this field, so a
            // later alias is not a better source.
            return parsed.filter(|v| v.is_finite());
        }
    }
    None
}

fn scan_price(doc: &Map<String, Value>) -> f64 {
    let parsed = match present(doc, "price") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|p| p.is_finite())
        .map(|p| p.max(0.0))
        .unwrap_or(0.0)
}

/// Convert a backend timestamp value to a UTC datetime.
///
/// Accepts the object form (`{seconds, nanoseconds}` or
/// `{_seconds, _nanoseconds}`), epoch seconds as a number, and RFC 3339
/// strings. Returns `None` for anything else.
pub fn unwrap_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            Utc.timestamp_opt(seconds, nanos).single()
        }
        Value::Number(n) => Utc.timestamp_opt(n.as_i64()?, 0).single(),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

/// Convert a heterogeneous backend document into a canonical record.
///
/// Pure and deterministic over `(doc, id, category_name)`; a maximally
/// degraded document yields empty strings, `None` coordinates, price 0 and
/// `available == false` rather than an error. Canonical field names lead
/// every alias list, so re-normalizing an already-normalized record is a
/// fixed point.
pub fn normalize_hoarding(
    doc: &Map<String, Value>,
    id: &str,
    category_name: &str,
) -> HoardingRecord {
    let title = string_field(doc, "title")
        .or_else(|| string_field(doc, "location"))
        .or_else(|| string_field(doc, "name"))
        .unwrap_or_else(|| category_name.to_string());

    let image = normalize_image(doc);

    let expiry_date = present(doc, "expiryDate").map(|v| {
        if v.is_object() {
            match unwrap_timestamp(v) {
                Some(dt) => Value::String(dt.to_rfc3339()),
                None => v.clone(),
            }
        } else {
            v.clone()
        }
    });

    // Unrecognized attributes are never dropped; canonical fields take
    // precedence over same-named raw fields.
    let extra: Map<String, Value> = doc
        .iter()
        .filter(|(k, _)| !CANONICAL_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    HoardingRecord {
        id: id.to_string(),
        title,
        location: string_field(doc, "location").unwrap_or_default(),
        category_name: category_name.to_string(),
        lat: scan_coordinate(doc, &LAT_ALIASES),
        lng: scan_coordinate(doc, &LNG_ALIASES),
        price: scan_price(doc),
        image_url: image.clone(),
        image,
        size: string_field(doc, "size").unwrap_or_default(),
        available: normalize_availability(doc),
        expiry_date,
        extra,
    }
}

impl HoardingRecord {
    /// Whether the record carries coordinates usable for map placement.
    ///
    /// Records without them stay in list views but are excluded from markers.
    pub fn has_coordinates(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}
