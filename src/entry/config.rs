//! Entry configuration.
//!
//! An entry configuration maps entry names to the waves that feed them:
//!
//! ```toml
//! [scan_1]
//! data = "root/scans/scan_1"
//! data_errors = "root/scans/scan_1_err"
//! data_units = "counts"
//! axis0 = "root/scans/energy"
//! axis0_name = "energy"
//! axis0_units = "eV"
//! axis1_name = "angular0"
//!
//! [scan_1.metadata]
//! "instrument/name" = "Phoibos 150"
//! "sample/temperature" = 21.5
//! ```
//!
//! JSON documents with the same shape are accepted as well. Metadata values
//! are scalars; TOML datetimes are kept as their RFC 3339 text and `null`
//! values are skipped.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use super::ConvertError;
use crate::wave::MAX_DIMS;

/// A literal value copied verbatim from `metadata`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Integer(i64),
    /// Floating-point literal
    Float(f64),
    /// String literal
    Text(String),
}

/// Caller-supplied replacements for one dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisOverride {
    /// Archive path of a wave holding the coordinates (`axis<N>`)
    pub wave: Option<String>,
    /// Output name of the axis (`axis<N>_name`)
    pub name: Option<String>,
    /// Units of the axis (`axis<N>_units`)
    pub units: Option<String>,
}

/// Configuration of one output entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryConfig {
    /// Data wave: a file name in single-wave mode, an archive path otherwise
    pub data: Option<String>,
    /// Archive path of the wave holding the data uncertainties
    pub data_errors: Option<String>,
    /// Units of the data, replacing the wave's own units
    pub data_units: Option<String>,
    /// Per-dimension overrides keyed by dimension index
    pub axes: BTreeMap<usize, AxisOverride>,
    /// Literal values written to `<entry>/<key>`
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl EntryConfig {
    /// Config whose data reference is `data`
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// Set the error wave reference
    pub fn data_errors(mut self, path: impl Into<String>) -> Self {
        self.data_errors = Some(path.into());
        self
    }

    /// Set the data units override
    pub fn data_units(mut self, units: impl Into<String>) -> Self {
        self.data_units = Some(units.into());
        self
    }

    /// Set the coordinate wave of dimension `dim`
    pub fn axis_wave(mut self, dim: usize, path: impl Into<String>) -> Self {
        self.axes.entry(dim).or_default().wave = Some(path.into());
        self
    }

    /// Rename dimension `dim`
    pub fn axis_name(mut self, dim: usize, name: impl Into<String>) -> Self {
        self.axes.entry(dim).or_default().name = Some(name.into());
        self
    }

    /// Set the units of dimension `dim`
    pub fn axis_units(mut self, dim: usize, units: impl Into<String>) -> Self {
        self.axes.entry(dim).or_default().units = Some(units.into());
        self
    }

    /// Add a metadata literal
    pub fn metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Override of dimension `dim`, if any
    pub fn axis(&self, dim: usize) -> Option<&AxisOverride> {
        self.axes.get(&dim)
    }

    /// Configured output name of dimension `dim`
    pub fn axis_name_for(&self, dim: usize) -> Option<&str> {
        self.axis(dim)?.name.as_deref()
    }

    /// Configured units of dimension `dim`
    pub fn axis_units_for(&self, dim: usize) -> Option<&str> {
        self.axis(dim)?.units.as_deref()
    }

    /// Configured coordinate wave of dimension `dim`
    pub fn axis_wave_for(&self, dim: usize) -> Option<&str> {
        self.axis(dim)?.wave.as_deref()
    }
}

/// Serialized form of one entry; axis keys are collected in `extra`
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    data_errors: Option<String>,
    #[serde(default)]
    data_units: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

/// Which field of an axis override a key like `axis2_units` sets
enum AxisField {
    Wave,
    Name,
    Units,
}

fn parse_axis_key(key: &str) -> Option<(usize, AxisField)> {
    let rest = key.strip_prefix("axis")?;
    let (index, field) = match rest.split_once('_') {
        None => (rest, AxisField::Wave),
        Some((index, "name")) => (index, AxisField::Name),
        Some((index, "units")) => (index, AxisField::Units),
        Some(_) => return None,
    };
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((index.parse().ok()?, field))
}

/// Key under which the toml deserializer hands out datetimes
const TOML_DATETIME_KEY: &str = "$__toml_private_datetime";

fn metadata_value(
    entry: &str,
    key: &str,
    value: serde_json::Value,
) -> Result<Option<MetadataValue>, ConvertError> {
    use serde_json::Value;

    let value = match value {
        Value::Null => return Ok(None),
        Value::Bool(v) => MetadataValue::Bool(v),
        Value::String(v) => MetadataValue::Text(v),
        Value::Number(n) => match n.as_i64() {
            Some(v) => MetadataValue::Integer(v),
            None => match n.as_f64() {
                Some(v) => MetadataValue::Float(v),
                None => {
                    return Err(ConvertError::InvalidConfig(format!(
                        "entry '{entry}': metadata '{key}' is out of range: {n}"
                    )))
                }
            },
        },
        Value::Object(mut map) if map.len() == 1 => match map.remove(TOML_DATETIME_KEY) {
            Some(Value::String(datetime)) => MetadataValue::Text(datetime),
            _ => {
                return Err(ConvertError::InvalidConfig(format!(
                    "entry '{entry}': metadata '{key}' must be a scalar"
                )))
            }
        },
        other => {
            return Err(ConvertError::InvalidConfig(format!(
                "entry '{entry}': metadata '{key}' must be a scalar, got {other}"
            )))
        }
    };
    Ok(Some(value))
}

impl RawEntry {
    fn into_config(self, entry: &str) -> Result<EntryConfig, ConvertError> {
        let mut config = EntryConfig {
            data: self.data,
            data_errors: self.data_errors,
            data_units: self.data_units,
            axes: BTreeMap::new(),
            metadata: BTreeMap::new(),
        };

        for (key, value) in self.metadata {
            match metadata_value(entry, &key, value)? {
                Some(value) => {
                    config.metadata.insert(key, value);
                }
                None => warn!("Entry '{}': metadata '{}' is null, skipping", entry, key),
            }
        }

        for (key, value) in self.extra {
            let Some((dim, field)) = parse_axis_key(&key) else {
                warn!("Entry '{}': ignoring unrecognized key '{}'", entry, key);
                continue;
            };
            if dim >= MAX_DIMS {
                return Err(ConvertError::InvalidConfig(format!(
                    "entry '{entry}': '{key}' refers to dimension {dim}, waves have at most {MAX_DIMS}"
                )));
            }
            let serde_json::Value::String(value) = value else {
                return Err(ConvertError::InvalidConfig(format!(
                    "entry '{entry}': '{key}' must be a string, got {value}"
                )));
            };
            let axis = config.axes.entry(dim).or_default();
            match field {
                AxisField::Wave => axis.wave = Some(value),
                AxisField::Name => axis.name = Some(value),
                AxisField::Units => axis.units = Some(value),
            }
        }
        Ok(config)
    }
}

/// All configured entries of a run, in name order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryConfigSet {
    entries: BTreeMap<String, EntryConfig>,
}

impl EntryConfigSet {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, name: impl Into<String>, config: EntryConfig) {
        self.entries.insert(name.into(), config);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_entry(mut self, name: impl Into<String>, config: EntryConfig) -> Self {
        self.insert(name, config);
        self
    }

    /// Configuration of entry `name`
    pub fn get(&self, name: &str) -> Option<&EntryConfig> {
        self.entries.get(name)
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntryConfig)> {
        self.entries.iter()
    }

    /// Entry names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entry is configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose `data` reference equals `data`
    pub fn find_by_data(&self, data: &str) -> Option<(&str, &EntryConfig)> {
        self.entries
            .iter()
            .find(|(_, config)| config.data.as_deref() == Some(data))
            .map(|(name, config)| (name.as_str(), config))
    }

    fn from_raw(raw: BTreeMap<String, RawEntry>) -> Result<Self, ConvertError> {
        let mut set = Self::new();
        for (name, entry) in raw {
            let config = entry.into_config(&name)?;
            set.insert(name, config);
        }
        Ok(set)
    }

    /// Parse a TOML entry configuration
    pub fn from_toml_str(content: &str) -> Result<Self, ConvertError> {
        let raw: BTreeMap<String, RawEntry> = toml::from_str(content)
            .map_err(|e| ConvertError::InvalidConfig(format!("TOML: {e}")))?;
        Self::from_raw(raw)
    }

    /// Parse a JSON entry configuration
    pub fn from_json_str(content: &str) -> Result<Self, ConvertError> {
        let raw: BTreeMap<String, RawEntry> = serde_json::from_str(content)
            .map_err(|e| ConvertError::InvalidConfig(format!("JSON: {e}")))?;
        Self::from_raw(raw)
    }

    /// Load an entry configuration file; the format follows the extension
    /// (`.json`, otherwise TOML)
    pub fn from_file(path: &Path) -> Result<Self, ConvertError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConvertError::Io {
            file: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }
}
