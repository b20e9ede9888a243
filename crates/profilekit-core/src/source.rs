//! Raw declarative profile sources
//!
//! A source maps section keys to parameter tables:
//! - `category` holds the alias table of the category (`alias = "target"`)
//! - `category:__common__` holds parameters shared by the category
//! - `category:name` holds the parameters of one profile
//!
//! Top-level scalars are kept as [`RawEntry::Scalar`] and ignored by the
//! compiler.

mod discovery;

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

pub use discovery::{SOURCE_FILE_NAME, SourceDiscovery};

use crate::error::{ProfileError, Result};
use crate::profile::{Profile, Value};

/// Separator between category and profile name in section keys
pub const SECTION_SEPARATOR: char = ':';

/// One top-level entry of a raw source
#[derive(Debug, Clone, PartialEq)]
pub enum RawEntry {
    /// Parameter table
    Section(Profile),
    /// Bare value outside any table
    Scalar(Value),
}

/// Unprocessed sections, ordered by key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSource {
    entries: BTreeMap<String, RawEntry>,
}

impl RawSource {
    /// Create an empty source
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style section insertion
    #[must_use]
    pub fn with_section<I, K, V>(mut self, key: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(key, RawEntry::Section(params.into_iter().collect()));
        self
    }

    /// Builder-style scalar insertion
    #[must_use]
    pub fn with_scalar(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, RawEntry::Scalar(value.into()));
        self
    }

    /// Insert an entry, replacing any previous one with the same key
    pub fn insert(&mut self, key: impl Into<String>, entry: RawEntry) -> Option<RawEntry> {
        self.entries.insert(key.into(), entry)
    }

    /// Look up an entry
    pub fn get(&self, key: &str) -> Option<&RawEntry> {
        self.entries.get(key)
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, RawEntry> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the source has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Parse`] if the text is not valid TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::parse(text, Path::new("<inline>"))
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Io`] if the file cannot be read and
    /// [`ProfileError::Parse`] if it is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ProfileError::io(path, source))?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self> {
        let table: toml::Table = toml::from_str(text).map_err(|source| ProfileError::Parse {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(Self::from_table(table))
    }

    fn from_table(table: toml::Table) -> Self {
        let mut source = Self::new();

        for (key, value) in table {
            let entry = match value {
                toml::Value::Table(params) => RawEntry::Section(section_params(&key, params)),
                other => match convert_scalar(other) {
                    Ok(value) => RawEntry::Scalar(value),
                    Err(_) => continue,
                },
            };
            source.insert(key, entry);
        }

        source
    }
}

impl<'a> IntoIterator for &'a RawSource {
    type Item = (&'a String, &'a RawEntry);
    type IntoIter = btree_map::Iter<'a, String, RawEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn section_params(section: &str, params: toml::Table) -> Profile {
    let mut profile = Profile::new();

    for (key, value) in params {
        match convert_scalar(value) {
            Ok(value) => {
                profile.insert(key, value);
            }
            Err(reason) => warn!(section, key = %key, reason, "Skipping profile parameter"),
        }
    }

    profile
}

/// Convert a TOML value to a parameter value, or say why it has none
///
/// `nan` and `inf` are refused since the JSON cache would turn them into `null`.
fn convert_scalar(value: toml::Value) -> std::result::Result<Value, &'static str> {
    match value {
        toml::Value::String(text) => Ok(Value::Text(text)),
        toml::Value::Integer(number) => Ok(Value::Integer(number)),
        toml::Value::Float(number) if number.is_finite() => Ok(Value::Float(number)),
        toml::Value::Float(_) => Err("non-finite float"),
        toml::Value::Boolean(flag) => Ok(Value::Bool(flag)),
        toml::Value::Datetime(datetime) => Ok(Value::Text(datetime.to_string())),
        toml::Value::Array(_) | toml::Value::Table(_) => Err("not a scalar"),
    }
}
