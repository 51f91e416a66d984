use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::module::{Module, ModuleMap};
use crate::error::{LinkError, Result};
use crate::manifest::{ManifestReader, PackageJsonReader};

/// Modules discovered under one packages root.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub modules: ModuleMap,
    /// Recoverable discovery problems, such as name collisions.
    pub warnings: Vec<String>,
}

pub struct ModuleScanner {
    reader: Box<dyn ManifestReader + Send + Sync>,
}

impl ModuleScanner {
    pub fn new() -> Self {
        Self::with_reader(Box::new(PackageJsonReader::new()))
    }

    pub fn with_reader(reader: Box<dyn ManifestReader + Send + Sync>) -> Self {
        Self { reader }
    }

    /// Registers every immediate child of `root_path` that holds a named
    /// manifest with at least one dependency table.
    ///
    /// Children are visited in file-name order; when two manifests share a
    /// name the earlier directory keeps it. With `single_package` set, every
    /// other module is still registered but marked skippable.
    pub fn scan_directory(
        &self,
        root_path: &Path,
        single_package: Option<&str>,
    ) -> Result<ScanOutcome> {
        if !root_path.is_dir() {
            return Err(LinkError::RootNotFound {
                path: root_path.to_path_buf(),
            });
        }

        let candidates: Vec<PathBuf> = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_dir())
            .collect();

        // Manifests are read in parallel; the collected order still matches
        // the directory listing, which is what the collision rule relies on.
        let discovered: Vec<Option<Module>> = candidates
            .par_iter()
            .map(|dir| self.read_candidate(dir, single_package))
            .collect::<Result<_>>()?;

        let mut outcome = ScanOutcome::default();
        for module in discovered.into_iter().flatten() {
            let (name, path) = (module.name.clone(), module.path.clone());
            if let Err(existing) = outcome.modules.insert(module) {
                let message = format!(
                    "duplicate module name '{}': keeping {}, ignoring {}",
                    name,
                    existing.path.display(),
                    path.display()
                );
                warn!("{}", message);
                outcome.warnings.push(message);
            }
        }

        debug!(
            "Discovered {} local modules under {}",
            outcome.modules.len(),
            root_path.display()
        );
        Ok(outcome)
    }

    fn read_candidate(&self, dir: &Path, single_package: Option<&str>) -> Result<Option<Module>> {
        let Some(record) = self.reader.read_manifest(dir)? else {
            debug!(
                "Skipping {}: no {}",
                dir.display(),
                self.reader.file_name()
            );
            return Ok(None);
        };

        let Some(name) = record.manifest.name.clone().filter(|name| !name.is_empty()) else {
            debug!("Skipping {}: manifest has no name", dir.display());
            return Ok(None);
        };

        if record.manifest.declares_no_dependencies() {
            debug!("Skipping {}: no dependencies declared", dir.display());
            return Ok(None);
        }

        let is_skippable = single_package.is_some_and(|focus| focus != name);
        let module = Module::new(name, dir.to_path_buf(), record.path)
            .with_dependencies(record.manifest.dependency_names())
            .with_skippable(is_skippable);

        Ok(Some(module))
    }
}

impl Default for ModuleScanner {
    fn default() -> Self {
        Self::new()
    }
}
