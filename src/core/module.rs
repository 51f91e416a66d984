use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// A locally developed package discovered under the packages root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    pub path: PathBuf,
    pub manifest_path: PathBuf,
    /// Runtime then development dependency names, in declaration order.
    pub dependency_names: Vec<String>,
    /// Set when focus mode targets some other module.
    pub is_skippable: bool,
}

impl Module {
    pub fn new(name: String, path: PathBuf, manifest_path: PathBuf) -> Self {
        Self {
            name,
            path,
            manifest_path,
            dependency_names: Vec::new(),
            is_skippable: false,
        }
    }

    pub fn with_dependencies(mut self, dependency_names: Vec<String>) -> Self {
        self.dependency_names = dependency_names;
        self
    }

    pub fn with_skippable(mut self, is_skippable: bool) -> Self {
        self.is_skippable = is_skippable;
        self
    }
}

/// Modules keyed by name, iterated in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModuleMap {
    modules: Vec<Module>,
    index: HashMap<String, usize>,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module` unless its name is taken. On collision the map is
    /// left untouched and the already registered module is returned.
    pub fn insert(&mut self, module: Module) -> Result<(), &Module> {
        if let Some(&existing) = self.index.get(&module.name) {
            return Err(&self.modules[existing]);
        }
        self.index.insert(module.name.clone(), self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.index.get(name).map(|&idx| &self.modules[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Module> {
        self.modules.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|module| module.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl<'a> IntoIterator for &'a ModuleMap {
    type Item = &'a Module;
    type IntoIter = std::slice::Iter<'a, Module>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Module> for ModuleMap {
    /// Later duplicates are dropped silently; the scanner is the place that reports them.
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        let mut map = ModuleMap::new();
        for module in iter {
            let _ = map.insert(module);
        }
        map
    }
}
