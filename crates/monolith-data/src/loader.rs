//! File-level plumbing for the catalog pipeline: extension-based format
//! detection, discovery of one data file per base name, and serde dispatch
//! over the supported formats.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use monolith_core::structure::TemplateError;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a machine catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No data file with the given base name exists in the directory.
    #[error("no '{name}' data file (.ron, .toml or .json) in {dir}")]
    MissingRequired { name: String, dir: PathBuf },

    /// The file extension is not one of the supported formats.
    #[error("unsupported data format: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same base name exists in more than one format.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// The file contents failed to deserialize.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference did not resolve against its registry.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// Two machine definitions share a name.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A machine's structure layout failed template validation.
    #[error("invalid structure for machine '{machine}' in {file}: {source}")]
    Template {
        file: PathBuf,
        machine: String,
        source: TemplateError,
    },

    /// An underlying filesystem read failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    fn parse(file: &Path, detail: impl fmt::Display) -> Self {
        CatalogError::Parse {
            file: file.to_path_buf(),
            detail: detail.to_string(),
        }
    }
}

// ===========================================================================
// Formats
// ===========================================================================

/// Supported data file formats, in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    /// Format of `path`, judged by its extension.
    pub fn detect(path: &Path) -> Result<Format, CatalogError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Format::ALL
            .into_iter()
            .find(|format| ext == Some(format.extension()))
            .ok_or_else(|| CatalogError::UnsupportedFormat {
                file: path.to_path_buf(),
            })
    }

    fn parse<T: DeserializeOwned>(self, path: &Path, text: &str) -> Result<T, CatalogError> {
        match self {
            Format::Ron => ron::from_str(text).map_err(|e| CatalogError::parse(path, e)),
            Format::Toml => toml::from_str(text).map_err(|e| CatalogError::parse(path, e)),
            Format::Json => serde_json::from_str(text).map_err(|e| CatalogError::parse(path, e)),
        }
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Locate the data file for `base_name` in `dir`.
///
/// At most one of `{base_name}.ron`, `.toml`, or `.json` may exist; a second
/// match is a [`CatalogError::ConflictingFormats`] error. Returns `Ok(None)`
/// when none exists.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, CatalogError> {
    let mut existing = Format::ALL
        .into_iter()
        .map(|format| dir.join(format!("{base_name}.{}", format.extension())))
        .filter(|path| path.exists());

    match (existing.next(), existing.next()) {
        (Some(a), Some(b)) => Err(CatalogError::ConflictingFormats { a, b }),
        (found, _) => Ok(found),
    }
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, CatalogError> {
    find_data_file(dir, base_name)?.ok_or_else(|| CatalogError::MissingRequired {
        name: base_name.to_owned(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read `path` and deserialize its whole contents, dispatching on extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let format = Format::detect(path)?;
    let text = fs::read_to_string(path)?;
    format.parse(path, &text)
}

/// Read a list of `T` from `path`.
///
/// RON and JSON files hold the list at top level. TOML has no top-level
/// arrays, so TOML files wrap it in a table and the list is read from
/// `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, CatalogError> {
    let format = Format::detect(path)?;
    let text = fs::read_to_string(path)?;
    if format != Format::Toml {
        return format.parse(path, &text);
    }

    let table: toml::Value = format.parse(path, &text)?;
    let Some(array) = table.get(toml_key) else {
        return Err(CatalogError::parse(
            path,
            format!("missing key '{toml_key}' in TOML file"),
        ));
    };
    array
        .clone()
        .try_into()
        .map_err(|e: toml::de::Error| CatalogError::parse(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up `name` in a registry map.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, CatalogError> {
    map.get(name).ok_or_else(|| CatalogError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_owned(),
        expected_kind,
    })
}

/// Reject `name` if the map already defines it.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), CatalogError> {
    if map.contains_key(name) {
        return Err(CatalogError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_owned(),
        });
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
