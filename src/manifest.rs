use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// The parts of `Cargo.toml` this tool cares about. Other keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CargoToml {
    pub package: Package,
    pub lib: Lib,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub edition: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lib {
    #[serde(rename = "crate-type")]
    pub crate_type: Vec<String>,
}

impl CargoToml {
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Android only loads shared objects, so `cdylib` has to be among the crate types.
    pub fn builds_cdylib(&self) -> bool {
        self.lib.crate_type.iter().any(|t| t == "cdylib")
    }
}

/// Resolves `manifest_path` against `source_dir` and checks it is a regular file.
///
/// The returned path is absolute.
pub fn locate(source_dir: &Path, manifest_path: &Path) -> Result<PathBuf> {
    let path = if manifest_path.is_absolute() {
        manifest_path.to_path_buf()
    } else {
        source_dir.join(manifest_path)
    };

    if !path.is_file() {
        return Err(Error::ManifestNotFound(path));
    }

    Ok(dunce::canonicalize(&path)?)
}
