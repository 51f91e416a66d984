pub mod package_json;

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use package_json::PackageJsonReader;

/// The slice of a package manifest the linker cares about.
///
/// Dependency tables keep their declaration order; versions are never
/// interpreted, so values are left as raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: Option<String>,
    pub dependencies: Option<Map<String, Value>>,
    pub dev_dependencies: Option<Map<String, Value>>,
}

impl Manifest {
    /// True when neither a runtime nor a development dependency table is declared.
    pub fn declares_no_dependencies(&self) -> bool {
        self.dependencies.is_none() && self.dev_dependencies.is_none()
    }

    /// Runtime dependency names followed by development dependency names,
    /// first occurrence wins.
    pub fn dependency_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let tables = [&self.dependencies, &self.dev_dependencies];
        for key in tables.into_iter().flatten().flat_map(|table| table.keys()) {
            if !names.iter().any(|existing| existing == key) {
                names.push(key.clone());
            }
        }
        names
    }
}

/// A manifest found on disk together with where it came from.
#[derive(Debug, Clone)]
pub struct ManifestRecord {
    pub path: PathBuf,
    pub manifest: Manifest,
}

/// Supplies parsed manifests for candidate module directories.
pub trait ManifestReader {
    /// Returns `Ok(None)` when the directory holds no manifest at all.
    fn read_manifest(&self, dir: &Path) -> Result<Option<ManifestRecord>>;

    fn file_name(&self) -> &str;
}
