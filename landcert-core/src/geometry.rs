//! Opaque geometry payloads with canonical equality
//!
//! Polygon and intersection geometry is produced upstream and never
//! interpreted here. Deduplication still needs structural equality over it,
//! so every payload carries a canonical rendering used for `Eq` and `Hash`:
//! object keys sorted, numbers normalized (`1.0 == 1`, `-0.0 == 0`), array
//! order preserved.

use crate::{compute_content_hash, ContentHash};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};

/// Opaque geometry payload (coordinates, GeoJSON fragments, ...).
#[derive(Clone)]
pub struct GeoPayload {
    value: Value,
    canonical: String,
}

impl GeoPayload {
    pub fn new(value: Value) -> Self {
        let canonical = canonical_json(&value);
        Self { value, canonical }
    }

    /// The payload exactly as supplied.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Canonical rendering used for equality and hashing.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// SHA-256 of the canonical rendering.
    pub fn content_hash(&self) -> ContentHash {
        compute_content_hash(self.canonical.as_bytes())
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl Default for GeoPayload {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

impl From<Value> for GeoPayload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl PartialEq for GeoPayload {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for GeoPayload {}

impl Hash for GeoPayload {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Debug for GeoPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPayload({})", self.canonical)
    }
}

impl Serialize for GeoPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GeoPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::new)
    }
}

/// Intersection area. Compared by normalized bit pattern so it can take part
/// in structural equality (`-0.0 == 0.0`, `NaN == NaN`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Area(f64);

impl Area {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    fn canonical_bits(&self) -> u64 {
        canonical_f64(self.0).to_bits()
    }
}

impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for Area {}

impl Hash for Area {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

impl From<f64> for Area {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

fn canonical_f64(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else if value.is_nan() {
        f64::NAN
    } else {
        value
    }
}

/// Render `value` in canonical form.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Sorted explicitly: serde_json may be built with `preserve_order`.
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

fn write_number(n: &serde_json::Number, out: &mut String) {
    if let Some(i) = n.as_i64() {
        let _ = write!(out, "{}", i);
    } else if let Some(u) = n.as_u64() {
        let _ = write!(out, "{}", u);
    } else if let Some(f) = n.as_f64() {
        let f = canonical_f64(f);
        if f.fract() == 0.0 && f.abs() < 9.0e15 {
            let _ = write!(out, "{}", f as i64);
        } else {
            let _ = write!(out, "{}", f);
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_key_order_does_not_matter() {
        let a: GeoPayload =
            serde_json::from_str(r#"{"type":"Point","coordinates":[31.2,30.1]}"#).unwrap();
        let b: GeoPayload =
            serde_json::from_str(r#"{"coordinates":[31.2,30.1],"type":"Point"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_integral_floats_equal_integers() {
        let a = GeoPayload::new(json!([1, 2, 3]));
        let b = GeoPayload::new(json!([1.0, 2.0, 3.0]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        let a = GeoPayload::new(json!({"x": -0.0}));
        let b = GeoPayload::new(json!({"x": 0}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_array_order_matters() {
        let a = GeoPayload::new(json!([[0, 0], [1, 1]]));
        let b = GeoPayload::new(json!([[1, 1], [0, 0]]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_serializes_original_value() {
        let value = json!({"b": 1.5, "a": [1, 2]});
        let payload = GeoPayload::new(value.clone());
        assert_eq!(serde_json::to_value(&payload).unwrap(), value);
    }

    #[test]
    fn test_canonical_escapes_strings() {
        let payload = GeoPayload::new(json!({"k": "a\"b\\c\n"}));
        assert_eq!(payload.canonical(), r#"{"k":"a\"b\\c\n"}"#);
    }

    #[test]
    fn test_hash_set_collapses_equal_payloads() {
        let mut set = HashSet::new();
        set.insert(GeoPayload::new(json!({"a": 1, "b": 2})));
        set.insert(GeoPayload::new(json!({"b": 2.0, "a": 1})));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_area_equality_normalizes_zero() {
        assert_eq!(Area::new(-0.0), Area::new(0.0));
        assert_eq!(Area::new(f64::NAN), Area::new(f64::NAN));
        assert_ne!(Area::new(120.5), Area::new(120.25));
    }
}
