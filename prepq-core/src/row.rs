use std::ops::Index;

use crate::value::{RawRow, Value};

/// Builds the externally visible form of a fetched row.
///
/// A [`ResultSet`][crate::result_set::ResultSet] calls this once per row access and never caches
/// the result.
pub trait MapFactory {
    type Map;

    fn create_from_fields(&self, fields: &RawRow) -> Self::Map;
}

impl<F, T> MapFactory for F
where
    F: Fn(&RawRow) -> T,
{
    type Map = T;

    #[inline]
    fn create_from_fields(&self, fields: &RawRow) -> T {
        self(fields)
    }
}

/// An ordered map of column names to values.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize), serde(transparent))]
pub struct Row {
    fields: RawRow,
}

impl Row {
    pub fn new(fields: RawRow) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn get_index(&self, index: usize) -> Option<(&str, &Value)> {
        self.fields
            .get_index(index)
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn into_fields(self) -> RawRow {
        self.fields
    }
}

impl Index<&str> for Row {
    type Output = Value;

    #[track_caller]
    fn index(&self, column: &str) -> &Value {
        self.get(column)
            .unwrap_or_else(|| panic!("no column found for name: {column}"))
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row::new(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// The default [`MapFactory`], producing a [`Row`] per fetched record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowFactory;

impl MapFactory for RowFactory {
    type Map = Row;

    fn create_from_fields(&self, fields: &RawRow) -> Row {
        Row::new(fields.clone())
    }
}

/// A [`MapFactory`] producing JSON objects.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMapFactory;

#[cfg(feature = "json")]
impl MapFactory for JsonMapFactory {
    type Map = serde_json::Map<String, serde_json::Value>;

    fn create_from_fields(&self, fields: &RawRow) -> Self::Map {
        fields
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::Null => serde_json::Value::Null,
                    Value::Integer(v) => serde_json::Value::from(*v),
                    // non-finite floats have no JSON form and become `null`
                    Value::Real(v) => serde_json::Value::from(*v),
                    Value::Text(v) => serde_json::Value::from(v.as_str()),
                    Value::Blob(v) => serde_json::Value::from(v.as_slice()),
                };

                (name.clone(), value)
            })
            .collect()
    }
}
