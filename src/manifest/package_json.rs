use std::fs;
use std::path::Path;

use super::{Manifest, ManifestReader, ManifestRecord};
use crate::error::{LinkError, Result};

pub const PACKAGE_JSON: &str = "package.json";

/// Reads `package.json` manifests.
#[derive(Debug, Clone, Default)]
pub struct PackageJsonReader;

impl PackageJsonReader {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_str(path: &Path, source: &str) -> Result<Manifest> {
        serde_json::from_str(source).map_err(|source| LinkError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ManifestReader for PackageJsonReader {
    fn read_manifest(&self, dir: &Path) -> Result<Option<ManifestRecord>> {
        let path = dir.join(PACKAGE_JSON);
        if !path.is_file() {
            return Ok(None);
        }

        let source = fs::read_to_string(&path).map_err(|source| LinkError::ManifestRead {
            path: path.clone(),
            source,
        })?;
        let manifest = Self::parse_str(&path, &source)?;

        Ok(Some(ManifestRecord { path, manifest }))
    }

    fn file_name(&self) -> &str {
        PACKAGE_JSON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(source: &str) -> Manifest {
        PackageJsonReader::parse_str(&PathBuf::from("package.json"), source).unwrap()
    }

    #[test]
    fn keeps_declaration_order_across_tables() {
        let manifest = parse(
            r#"{
                "name": "app",
                "dependencies": { "zeta": "^1.0.0", "alpha": "^2.0.0" },
                "devDependencies": { "mocha": "*", "zeta": "^1.0.0" }
            }"#,
        );
        assert_eq!(manifest.dependency_names(), vec!["zeta", "alpha", "mocha"]);
    }

    #[test]
    fn missing_tables_are_reported() {
        let manifest = parse(r#"{ "name": "lonely", "version": "1.0.0" }"#);
        assert!(manifest.declares_no_dependencies());

        let manifest = parse(r#"{ "name": "empty", "devDependencies": {} }"#);
        assert!(!manifest.declares_no_dependencies());
        assert!(manifest.dependency_names().is_empty());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PackageJsonReader::parse_str(&PathBuf::from("pkg/package.json"), "{ nope")
            .unwrap_err();
        assert!(matches!(err, LinkError::ManifestParse { .. }));
    }

    #[test]
    fn directory_without_manifest_yields_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let reader = PackageJsonReader::new();
        assert!(reader.read_manifest(dir.path()).unwrap().is_none());
    }
}
