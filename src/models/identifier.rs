use std::fmt;

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Canonical entity identifier.
///
/// Upstream records carry identifiers as JSON numbers, numeric strings, or
/// UUID-like strings depending on which generation of the data source
/// produced them. Construction canonicalizes once, at the ingestion boundary:
/// integer-valued input becomes `Numeric`, everything else is kept as trimmed
/// text. Equality and hashing are structural, so `42` and `"42"` ingest to
/// the same value and a set lookup succeeds no matter which form either side
/// arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityId {
    Numeric(i64),
    Text(String),
}

impl EntityId {
    /// Canonicalizes a raw string identifier. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Some(EntityId::Numeric(n));
        }
        // "42.0" style numerics still refer to record 42 upstream.
        if let Ok(f) = trimmed.parse::<f64>() {
            if let Some(id) = Self::from_f64(f) {
                return Some(id);
            }
        }
        Some(EntityId::Text(trimmed.to_string()))
    }

    pub fn from_i64(n: i64) -> Self {
        EntityId::Numeric(n)
    }

    /// Canonicalizes a float identifier; non-integral or out-of-range values
    /// are not usable as record identifiers.
    pub fn from_f64(f: f64) -> Option<Self> {
        if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            Some(EntityId::Numeric(f as i64))
        } else {
            None
        }
    }

    /// The numeric representation, when one exists.
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            EntityId::Numeric(n) => Some(*n),
            EntityId::Text(_) => None,
        }
    }

    /// Whether this identifier is a UUID in text form.
    pub fn is_uuid_like(&self) -> bool {
        match self {
            EntityId::Numeric(_) => false,
            EntityId::Text(s) => Uuid::parse_str(s).is_ok(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Numeric(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Numeric(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::parse(s).unwrap_or_else(|| EntityId::Text(String::new()))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EntityId::Numeric(n) => serializer.serialize_i64(*n),
            EntityId::Text(s) => serializer.serialize_str(s),
        }
    }
}
