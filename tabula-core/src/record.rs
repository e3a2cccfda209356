//! Ordered field maps used as condition maps and write payloads

use crate::{Error, Result, Value};

/// An ordered mapping from key to an optional value.
///
/// `None` marks an absent entry: it is stripped before the map is used as a
/// filter or a payload, so callers can pass optional inputs straight through.
/// `Some(Value::Null)` is a real NULL and is kept.
///
/// Keys are unique; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Option<Value>)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::insert`]. A `None` value records the key as
    /// absent; pass [`Value::Null`] for a real NULL.
    ///
    /// # Examples
    /// ```
    /// use tabula_core::{Record, Value};
    ///
    /// let name: Option<&str> = None;
    /// let conditions = Record::new()
    ///     .with("status", "active")
    ///     .with("name", name)
    ///     .with("deleted_at", Value::Null);
    /// assert_eq!(conditions.stripped().len(), 2);
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl IntoField) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder form of [`Record::insert_opt`]
    pub fn with_opt<V: Into<Value>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert_opt(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl IntoField) {
        self.put(key.into(), value.into_field());
    }

    /// Insert an optional value; `None` records the key as absent
    pub fn insert_opt<V: Into<Value>>(&mut self, key: impl Into<String>, value: Option<V>) {
        self.put(key.into(), value.map(Into::into));
    }

    fn put(&mut self, key: String, value: Option<Value>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The value stored under `key`, or `None` when missing or absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        self.entries.remove(index).1
    }

    /// Number of entries, absent ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Entries with absent values stripped, in insertion order
    pub fn present(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    /// True when no entry survives absent-stripping
    pub fn is_blank(&self) -> bool {
        self.present().next().is_none()
    }

    /// Owned copy of the present entries
    pub fn stripped(&self) -> Vec<(String, Value)> {
        self.present()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Values a [`Record`] entry accepts. `None` becomes an absent entry
/// rather than a NULL.
pub trait IntoField {
    fn into_field(self) -> Option<Value>;
}

impl<T: Into<Value>> IntoField for Option<T> {
    fn into_field(self) -> Option<Value> {
        self.map(Into::into)
    }
}

macro_rules! present_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoField for $ty {
                fn into_field(self) -> Option<Value> {
                    Some(self.into())
                }
            }
        )*
    };
}

present_field!(
    Value,
    (),
    bool,
    i32,
    i64,
    u32,
    u64,
    f32,
    f64,
    String,
    &str,
    &String,
    serde_json::Value,
);

#[cfg(feature = "uuid-support")]
present_field!(uuid::Uuid);

#[cfg(feature = "datetime-support")]
present_field!(chrono::NaiveDateTime, chrono::NaiveDate);

#[cfg(feature = "decimal-support")]
present_field!(rust_decimal::Decimal);

#[cfg(feature = "datetime-support")]
impl<Tz: chrono::TimeZone> IntoField for chrono::DateTime<Tz> {
    fn into_field(self) -> Option<Value> {
        Some(self.into())
    }
}

impl<T> IntoField for Vec<T>
where
    Vec<T>: Into<Value>,
{
    fn into_field(self) -> Option<Value> {
        Some(self.into())
    }
}

impl<T: Clone + Into<Value>> IntoField for &[T] {
    fn into_field(self) -> Option<Value> {
        Some(self.into())
    }
}

impl<T: Into<Value>, const N: usize> IntoField for [T; N] {
    fn into_field(self) -> Option<Value> {
        Some(self.into())
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: IntoField,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Record
where
    K: Into<String>,
    V: IntoField,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

/// Only JSON objects convert; JSON `null` values stay real NULLs.
impl TryFrom<serde_json::Value> for Record {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(map.into()),
            other => Err(Error::invalid_argument(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new().with("a", 1).with("b", 2);
        record.insert("a", 3);
        let keys: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&Value::I32(3)));
    }

    #[test]
    fn test_absent_values_are_stripped() {
        let record = Record::new()
            .with("a", "b")
            .with_opt("c", None::<i32>)
            .with("d", Value::Null);

        assert_eq!(record.len(), 3);
        assert_eq!(
            record.stripped(),
            vec![
                ("a".to_string(), Value::from("b")),
                ("d".to_string(), Value::Null),
            ]
        );
        assert_eq!(record.get("c"), None);
    }

    #[test]
    fn test_none_is_absent_not_null() {
        let missing: Option<i32> = None;
        let record = Record::new()
            .with("a", missing)
            .with("b", Some(2))
            .with("c", Value::Null);

        assert_eq!(record.get("a"), None);
        assert_eq!(
            record.stripped(),
            vec![
                ("b".to_string(), Value::I32(2)),
                ("c".to_string(), Value::Null),
            ]
        );
    }

    #[test]
    fn test_is_blank() {
        assert!(Record::new().is_blank());
        assert!(Record::new().with_opt("a", None::<&str>).is_blank());
        assert!(!Record::new().with("a", Value::Null).is_blank());
    }

    #[test]
    fn test_try_from_json() {
        let record = Record::try_from(json!({"a": "b", "ids": [1, 2]})).unwrap();
        assert_eq!(record.get("a"), Some(&Value::from("b")));
        assert_eq!(
            record.get("ids"),
            Some(&Value::Array(vec![Value::I64(1), Value::I64(2)]))
        );

        let err = Record::try_from(json!([1, 2])).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_remove() {
        let mut record = Record::from([("a", 1), ("b", 2)]);
        assert_eq!(record.remove("a"), Some(Value::I32(1)));
        assert_eq!(record.remove("a"), None);
        assert_eq!(record.len(), 1);
    }
}
