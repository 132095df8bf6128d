//! Format-agnostic loading of reconciliation arguments
//!
//! Arguments are kept as an untyped map until the validation gate turns
//! them into a typed request, so that missing and unsupported fields can be
//! reported by name.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{Error, Result};

/// Raw argument map: field name to value.
pub type Args = BTreeMap<String, Value>;

/// Loads argument files, detecting the format from the file extension.
#[derive(Debug, Default)]
pub struct ArgsStore;

impl ArgsStore {
    pub fn new() -> Self {
        Self
    }

    /// Load arguments from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load(&self, path: &Path) -> Result<Args> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.parse(&content, &extension).map_err(|e| match e {
            Error::ArgsParse { format, message, .. } => Error::ArgsParse {
                path: path.to_path_buf(),
                format,
                message,
            },
            other => other,
        })
    }

    /// Parse arguments from a string in the format named by `extension`.
    pub fn parse(&self, content: &str, extension: &str) -> Result<Args> {
        let parse_error = |format: &str, message: String| Error::ArgsParse {
            path: Default::default(),
            format: format.into(),
            message,
        };
        match extension {
            "toml" => toml::from_str(content).map_err(|e| parse_error("TOML", e.to_string())),
            "json" => {
                serde_json::from_str(content).map_err(|e| parse_error("JSON", e.to_string()))
            }
            "yaml" | "yml" => {
                serde_yaml::from_str(content).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }
}
