use std::collections::BTreeMap;

use serde::Serialize;

use super::MetadataValue;
use crate::wave::WaveArray;

/// A value stored under one output key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoreValue {
    /// Array with its shape
    Array(WaveArray),
    /// Integer scalar
    Integer(i64),
    /// Float scalar
    Float(f64),
    /// Boolean scalar
    Bool(bool),
    /// String
    Text(String),
    /// List of strings
    TextList(Vec<String>),
}

impl StoreValue {
    /// The string, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoreValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The array, if this is an array value
    pub fn as_array(&self) -> Option<&WaveArray> {
        match self {
            StoreValue::Array(array) => Some(array),
            _ => None,
        }
    }

    /// The strings, if this is a list value
    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            StoreValue::TextList(list) => Some(list),
            _ => None,
        }
    }

    /// The integer, if this is an integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StoreValue::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<WaveArray> for StoreValue {
    fn from(array: WaveArray) -> Self {
        StoreValue::Array(array)
    }
}

impl From<String> for StoreValue {
    fn from(text: String) -> Self {
        StoreValue::Text(text)
    }
}

impl From<&str> for StoreValue {
    fn from(text: &str) -> Self {
        StoreValue::Text(text.to_string())
    }
}

impl From<Vec<String>> for StoreValue {
    fn from(list: Vec<String>) -> Self {
        StoreValue::TextList(list)
    }
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        StoreValue::Integer(value)
    }
}

impl From<MetadataValue> for StoreValue {
    fn from(value: MetadataValue) -> Self {
        match value {
            MetadataValue::Bool(v) => StoreValue::Bool(v),
            MetadataValue::Integer(v) => StoreValue::Integer(v),
            MetadataValue::Float(v) => StoreValue::Float(v),
            MetadataValue::Text(v) => StoreValue::Text(v),
        }
    }
}

/// Flat output of a conversion run, keyed by `"<entry>/<field>[.attribute]"`.
///
/// Keys iterate in sorted order. Writing an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutputStore {
    values: BTreeMap<String, StoreValue>,
}

impl OutputStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<StoreValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&StoreValue> {
        self.values.get(key)
    }

    /// Text stored under `key`
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_text()
    }

    /// Array stored under `key`
    pub fn get_array(&self, key: &str) -> Option<&WaveArray> {
        self.get(key)?.as_array()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing was written
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Key/value pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StoreValue)> {
        self.values.iter()
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Distinct entry names (the first key segment); `["entry"]` for an empty store
    pub fn entry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .keys()
            .map(|key| key.split('/').next().unwrap_or(key).to_string())
            .collect();
        names.dedup();
        if names.is_empty() {
            names.push("entry".to_string());
        }
        names
    }

    /// The `dims` list written for `entry`
    pub fn dims(&self, entry: &str) -> Option<&[String]> {
        self.get(&format!("{entry}/dims"))?.as_text_list()
    }
}
