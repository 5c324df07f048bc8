//! Forgiving readers for host document fields
//!
//! Host documents are edited by hand and by older clients, so a field may hold
//! a float, a numeric string, `null` or something unrelated. One bad value
//! falls back to its default instead of rejecting the whole document.
//!
//! Use with `#[serde(default, deserialize_with = "...")]`.

use std::collections::HashMap;
use std::hash::Hash;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Any JSON value, sorted by how it can be read as a number or text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Loose {
    /// Whole number, truncating floats and parsing numeric text.
    fn whole(&self) -> Option<i64> {
        let float = match self {
            Self::Int(n) => return Some(*n),
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Other(_) => return None,
        };
        // `as` saturates at the i64 bounds
        float.is_finite().then(|| float.trunc() as i64)
    }

    fn count(&self) -> Option<u32> {
        self.whole()
            .map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
    }

    fn int(&self) -> Option<i32> {
        self.whole().map(|n| {
            i32::try_from(n).unwrap_or(if n < 0 { i32::MIN } else { i32::MAX })
        })
    }

    fn text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A value of `T`, or a marker for anything that failed to parse as one.
#[derive(Deserialize)]
#[serde(untagged)]
enum OrSkip<T> {
    Value(T),
    Skip(IgnoredAny),
}

impl<T> OrSkip<T> {
    fn value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Skip(_) => None,
        }
    }
}

/// Non-negative count; negatives read as 0, unreadable values as 0.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.count().unwrap_or(0))
}

/// Optional count; unreadable values are absent, negatives read as 0.
pub(crate) fn optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.count())
}

/// Signed whole number, clamped to the `i32` range.
pub(crate) fn int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_int(deserializer)?.unwrap_or(0))
}

pub(crate) fn optional_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.int())
}

pub(crate) fn wide_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_wide_int(deserializer)?.unwrap_or(0))
}

pub(crate) fn optional_wide_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.whole())
}

/// Text; anything that is not a string reads as empty.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.text())
}

pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(OrSkip::<bool>::deserialize(deserializer)?
        .value()
        .unwrap_or_default())
}

/// `T`, or its default when the stored value does not fit.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(OrSkip::<T>::deserialize(deserializer)?
        .value()
        .unwrap_or_default())
}

/// `Some(T)`, or `None` when the stored value does not fit.
pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(OrSkip::<T>::deserialize(deserializer)?.value())
}

/// List that drops entries which do not parse; a non-list reads as empty.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = OrSkip::<Vec<OrSkip<T>>>::deserialize(deserializer)?
        .value()
        .unwrap_or_default();
    Ok(entries.into_iter().filter_map(OrSkip::value).collect())
}

/// Map that drops values which do not parse; a non-map reads as empty.
pub(crate) fn map<'de, D, K, V>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
{
    let entries = OrSkip::<HashMap<K, OrSkip<V>>>::deserialize(deserializer)?
        .value()
        .unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|(k, v)| v.value().map(|v| (k, v)))
        .collect())
}

/// Skill ranks: numeric values are read loosely, other values are dropped.
pub(crate) fn ranks<'de, D>(deserializer: D) -> Result<HashMap<String, i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = OrSkip::<HashMap<String, Loose>>::deserialize(deserializer)?
        .value()
        .unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|(id, rank)| rank.int().map(|rank| (id, rank)))
        .collect())
}
