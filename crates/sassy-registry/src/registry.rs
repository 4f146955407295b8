//! Module registry types.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A module registry answers three questions about a package: which logical
//! module names it declares (and where their source files live), which
//! packages it depends on, and which named registries its declarations
//! belong to. Resolution code only ever sees the [`ModuleRegistry`] trait,
//! so the metadata backend is swappable.

use std::path::PathBuf;

use hashlink::LinkedHashMap;

/// Mapping from logical module name (a `/`-delimited path such as
/// `example/package/index`) to the source file backing it.
///
/// Iteration follows insertion order. All merge paths write through
/// [`LinkedHashMap::replace`], which updates an existing key's value in
/// place without moving the key, so collisions are last-write-wins while
/// iteration order stays that of first declaration. Plain `insert` moves
/// an existing key to the back and is not used for merging.
pub type ModuleMap = LinkedHashMap<String, PathBuf>;

/// Source of package metadata for sourcepath resolution.
///
/// Lookups for unknown packages return empty results rather than errors:
/// a package with no declarations is a legitimate (if unusual) input, and
/// the resolution layer decides whether an empty aggregate is a problem.
pub trait ModuleRegistry {
    /// The modules `package` declares under `registry`.
    fn module_map(&self, package: &str, registry: &str) -> ModuleMap;

    /// The packages `package` depends on, in declaration order.
    fn dependencies(&self, package: &str) -> Vec<String>;

    /// The registries `package` declares its modules under.
    fn declared_registries(&self, package: &str) -> Vec<String>;

    /// Bundled (vendored) sourcepaths declared by `package`.
    ///
    /// Bundle entries are registered at whatever granularity the package
    /// chose, typically a directory covering an entire vendored library.
    /// Relative paths are anchored to the working directory at resolution
    /// time.
    fn bundle_map(&self, package: &str) -> ModuleMap;
}

#[derive(Debug, Default)]
struct PackageRecord {
    depends: Vec<String>,
    registries: Vec<String>,
    /// registry name -> module map
    modules: LinkedHashMap<String, ModuleMap>,
    bundled: ModuleMap,
}

/// An in-memory [`ModuleRegistry`].
///
/// Declarations are made either programmatically (tests) or by loading a
/// [`RegistryManifest`](crate::RegistryManifest) (the CLI path).
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    packages: LinkedHashMap<String, PackageRecord>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a package along with its dependencies and registries.
    ///
    /// Re-declaring a package replaces its dependency and registry lists
    /// but keeps any modules already declared for it.
    pub fn declare_package(&mut self, name: &str, depends: &[&str], registries: &[&str]) {
        let record = self
            .packages
            .entry(name.to_string())
            .or_insert_with(PackageRecord::default);
        record.depends = depends.iter().map(|d| d.to_string()).collect();
        record.registries = registries.iter().map(|r| r.to_string()).collect();
    }

    /// Declare a module for `package` under `registry`.
    pub fn declare_module(
        &mut self,
        package: &str,
        registry: &str,
        module: &str,
        path: impl Into<PathBuf>,
    ) {
        self.packages
            .entry(package.to_string())
            .or_insert_with(PackageRecord::default)
            .modules
            .entry(registry.to_string())
            .or_insert_with(ModuleMap::new)
            .replace(module.to_string(), path.into());
    }

    /// Declare a bundled (vendored) sourcepath for `package`.
    pub fn declare_bundle(&mut self, package: &str, module: &str, path: impl Into<PathBuf>) {
        self.packages
            .entry(package.to_string())
            .or_insert_with(PackageRecord::default)
            .bundled
            .replace(module.to_string(), path.into());
    }

    fn record(&self, package: &str) -> Option<&PackageRecord> {
        let record = self.packages.get(package);
        if record.is_none() {
            tracing::debug!(package, "lookup for undeclared package");
        }
        record
    }
}

impl ModuleRegistry for MemoryRegistry {
    fn module_map(&self, package: &str, registry: &str) -> ModuleMap {
        self.record(package)
            .and_then(|r| r.modules.get(registry))
            .cloned()
            .unwrap_or_default()
    }

    fn dependencies(&self, package: &str) -> Vec<String> {
        self.record(package)
            .map(|r| r.depends.clone())
            .unwrap_or_default()
    }

    fn declared_registries(&self, package: &str) -> Vec<String> {
        self.record(package)
            .map(|r| r.registries.clone())
            .unwrap_or_default()
    }

    fn bundle_map(&self, package: &str) -> ModuleMap {
        self.record(package)
            .map(|r| r.bundled.clone())
            .unwrap_or_default()
    }
}
