//! Coercion of loosely-typed persisted or external values into canonical,
//! enum-constrained domain values.
//!
//! Every function in this module is total: unrecognized enum strings fall
//! back to a fixed per-enum default, malformed JSON degrades to `None` or an
//! empty object, and batch conversion drops bad rows instead of failing.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Define a closed string-backed enum with a fallback member.
///
/// Generates `as_str`, `parse` (strict, `None` for unknown values),
/// `normalize` (total, unknown or absent values map to the default),
/// `ALL`, `Default`, `Display`, and serde support. Deserialization goes
/// through `normalize`, so any JSON string (or `null`) yields a member.
macro_rules! define_normalized_enum {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "Option<String>")]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Member used when the raw value is absent or unrecognized.
            pub const DEFAULT: Self = Self::$default;

            /// All declared values, in declaration order.
            pub const ALL: &'static [&'static str] = &[$($text),+];

            /// Return the canonical string form.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }

            /// Strict parse. Returns `None` for anything not declared.
            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $( $text => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Total parse: unknown or missing values become [`Self::DEFAULT`].
            pub fn normalize(raw: Option<&str>) -> Self {
                raw.and_then(Self::parse).unwrap_or(Self::DEFAULT)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl From<Option<String>> for $name {
            fn from(raw: Option<String>) -> Self {
                Self::normalize(raw.as_deref())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use define_normalized_enum;

// ---------------------------------------------------------------------------
// Safe JSON parsing
// ---------------------------------------------------------------------------

/// Parse `raw` as a JSON object.
///
/// Returns `None` when the input is absent, blank, not valid JSON, or valid
/// JSON that is not an object. Parse failures are logged, never propagated.
pub fn parse_json_object(raw: Option<&str>, field: &'static str) -> Option<Map<String, Value>> {
    let text = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            tracing::warn!(field, kind = json_kind(&other), "Expected a JSON object");
            None
        }
        Err(e) => {
            tracing::warn!(field, error = %e, "Failed to parse JSON field");
            None
        }
    }
}

/// Parse an optional standalone JSON field into a typed value.
///
/// The raw text must be a JSON object that deserializes into `T`;
/// anything else yields `None`.
pub fn parse_json_field<T: DeserializeOwned>(raw: Option<&str>, field: &'static str) -> Option<T> {
    let map = parse_json_object(raw, field)?;
    match serde_json::from_value::<T>(Value::Object(map)) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(field, error = %e, "JSON field has an unexpected shape");
            None
        }
    }
}

/// Parse a free-form metadata blob. Degrades to `{}` on any failure.
pub fn parse_metadata(raw: Option<&str>) -> Value {
    Value::Object(parse_json_object(raw, "metadata").unwrap_or_default())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Placeholder file name when a URL is missing or has no usable segment.
pub const UNKNOWN_FILE_NAME: &str = "unknown";

/// Extract the last path segment of `url`, percent-decoded.
///
/// Query strings and fragments are ignored. For absolute (`scheme://`) and
/// protocol-relative (`//`) URLs the authority is skipped, so a URL with no
/// path yields [`UNKNOWN_FILE_NAME`], as does an empty input. Empty segments
/// inside the path are ignored. A segment that fails to decode is returned
/// as-is.
pub fn file_name_from_url(url: Option<&str>) -> String {
    let Some(url) = url.map(str::trim).filter(|s| !s.is_empty()) else {
        return UNKNOWN_FILE_NAME.to_string();
    };

    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let path = match without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .or_else(|| without_query.strip_prefix("//"))
    {
        Some(after_scheme) => after_scheme.split_once('/').map_or("", |(_, path)| path),
        None => without_query,
    };

    let Some(segment) = path.rsplit('/').find(|s| !s.is_empty()) else {
        return UNKNOWN_FILE_NAME.to_string();
    };

    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}

/// Read a numeric `confidence` out of a parsed metadata object.
///
/// Accepts JSON numbers and numeric strings. Non-finite values are dropped.
pub fn confidence_from_metadata(metadata: &Value) -> Option<f64> {
    let value = match metadata.get("confidence")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Clamp a raw progress value into `0..=100`. Missing means 0.
pub fn clamp_progress(raw: Option<i32>) -> u8 {
    raw.unwrap_or(0).clamp(0, 100) as u8
}

/// Coerce a raw size into a non-negative byte count. Missing means 0.
pub fn non_negative_size(raw: Option<i64>) -> i64 {
    raw.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Batch conversion
// ---------------------------------------------------------------------------

/// Convert a batch of raw rows, dropping the ones `convert` rejects.
///
/// `convert` returns `None` for rows lacking their identity field or
/// otherwise unusable; those rows are logged and skipped so one bad row
/// never fails the whole batch.
pub fn normalize_batch<R, T, F>(
    rows: impl IntoIterator<Item = R>,
    entity: &'static str,
    mut convert: F,
) -> Vec<T>
where
    F: FnMut(R) -> Option<T>,
{
    let mut skipped = 0usize;
    let out: Vec<T> = rows
        .into_iter()
        .filter_map(|row| {
            let converted = convert(row);
            if converted.is_none() {
                skipped += 1;
            }
            converted
        })
        .collect();

    if skipped > 0 {
        tracing::warn!(entity, skipped, kept = out.len(), "Dropped malformed rows");
    }
    out
}
