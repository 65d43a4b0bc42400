//! The configuration format: a named list of selected feature identifiers
//!
//! ```json
//! { "name": "justA", "features": ["A"] }
//! ```

use crate::error::TraceIoError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vartrace_formula::{Configuration, Variant};

#[derive(Debug, Serialize, Deserialize)]
struct ConfigurationFile {
    name: String,
    features: Vec<String>,
}

/// Write a variant's configuration
///
/// Features come out in sorted order, so writing is deterministic. Parent
/// directories are created as needed.
///
/// # Errors
/// IO and serialization failures are tagged with the path.
pub fn write_configuration(variant: &Variant, path: &Path) -> Result<(), TraceIoError> {
    let file = ConfigurationFile {
        name: variant.name().to_string(),
        features: variant
            .configuration()
            .features()
            .map(str::to_string)
            .collect(),
    };
    let tag_io = |source: std::io::Error| TraceIoError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(&file).map_err(|source| TraceIoError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(tag_io)?;
    }
    std::fs::write(path, json).map_err(tag_io)
}

/// Read a variant back from its configuration file
///
/// # Errors
/// IO and deserialization failures are tagged with the path.
pub fn read_configuration(path: &Path) -> Result<Variant, TraceIoError> {
    let text = std::fs::read_to_string(path).map_err(|source| TraceIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigurationFile =
        serde_json::from_str(&text).map_err(|source| TraceIoError::Config {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Variant::new(
        file.name,
        Configuration::from_features(file.features),
    ))
}
