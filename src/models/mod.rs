//! Data models for the club site.
//!
//! Field names match the on-disk JSON documents, so older data files load unchanged.

mod club;
mod event;
mod gallery;
mod member;

pub use club::*;
pub use event::*;
pub use gallery::*;
pub use member::*;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Names of the required fields that are empty after trimming.
pub(crate) fn missing_required(fields: &[(&str, &str)]) -> Vec<String> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A record persisted as one JSON object.
pub trait Record: Serialize {
    fn defaulted(&self) -> &Defaulted;
    fn defaulted_mut(&mut self) -> &mut Defaulted;
}

/// Keys a record was loaded without, with the default each one was given.
///
/// Writing the record back leaves such a key out again while it still holds
/// that default, so sparse data files keep their shape.
#[derive(Debug, Clone, Default)]
pub struct Defaulted(Vec<DefaultedKey>);

#[derive(Debug, Clone)]
struct DefaultedKey {
    /// JSON pointer of the enclosing object
    parent: String,
    key: String,
    value: Value,
}

impl Defaulted {
    /// Compare what was on disk with the same record serialized after loading.
    pub fn between(raw: &Value, filled: &Value) -> Self {
        let mut keys = Vec::new();
        collect_defaulted(raw, filled, String::new(), &mut keys);
        Self(keys)
    }

    /// Drop the defaulted keys from `value` that still hold their default.
    pub fn strip(&self, value: &mut Value) {
        for entry in &self.0 {
            if let Some(Value::Object(parent)) = value.pointer_mut(&entry.parent) {
                if parent.get(&entry.key) == Some(&entry.value) {
                    parent.remove(&entry.key);
                }
            }
        }
    }
}

// Bookkeeping only; two records with the same fields are equal.
impl PartialEq for Defaulted {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

fn collect_defaulted(raw: &Value, filled: &Value, pointer: String, out: &mut Vec<DefaultedKey>) {
    match (raw, filled) {
        (Value::Object(raw), Value::Object(filled)) => {
            for (key, value) in filled {
                match raw.get(key) {
                    Some(raw_value) => {
                        let child = format!("{}/{}", pointer, escape_pointer(key));
                        collect_defaulted(raw_value, value, child, out);
                    }
                    None => out.push(DefaultedKey {
                        parent: pointer.clone(),
                        key: key.clone(),
                        value: value.clone(),
                    }),
                }
            }
        }
        (Value::Array(raw), Value::Array(filled)) => {
            for (index, (raw_value, value)) in raw.iter().zip(filled).enumerate() {
                collect_defaulted(raw_value, value, format!("{}/{}", pointer, index), out);
            }
        }
        _ => {}
    }
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub events_count: usize,
    pub members_count: usize,
    pub gallery_count: usize,
}

/// Everything the public site shows, in one payload.
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub club: ClubInfo,
    pub contact: ContactInfo,
    pub events: Vec<Event>,
    pub members: Vec<Member>,
    pub gallery: Vec<GalleryItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_defaulted_strips_only_untouched_defaults() {
        let raw = json!({"name": "Ada", "team": {"lead": "Bo"}});
        let filled = json!({
            "name": "Ada", "role": "", "year": "",
            "team": {"lead": "Bo", "size": 0}
        });
        let defaulted = Defaulted::between(&raw, &filled);

        let mut unchanged = filled.clone();
        defaulted.strip(&mut unchanged);
        assert_eq!(unchanged, raw);

        let mut edited = json!({
            "name": "Ada", "role": "Lead", "year": "",
            "team": {"lead": "Bo", "size": 0}
        });
        defaulted.strip(&mut edited);
        assert_eq!(edited, json!({"name": "Ada", "role": "Lead", "team": {"lead": "Bo"}}));
    }

    #[test]
    fn test_defaulted_escapes_pointer_keys() {
        let raw = json!({"a/b": {}});
        let filled = json!({"a/b": {"c": 1}});
        let mut value = filled.clone();
        Defaulted::between(&raw, &filled).strip(&mut value);
        assert_eq!(value, raw);
    }

    #[test]
    fn test_missing_required_treats_whitespace_as_empty() {
        let missing = missing_required(&[("name", "Ada"), ("role", "  "), ("year", "")]);
        assert_eq!(missing, vec!["role".to_string(), "year".to_string()]);
    }
}
