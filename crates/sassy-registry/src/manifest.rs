//! Registry manifests.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A manifest is the on-disk form of a [`MemoryRegistry`]: a JSON document
//! declaring, per package, its dependencies, registries, module maps and
//! bundled sourcepaths. Relative paths in a manifest are anchored to the
//! directory containing the manifest file.
//!
//! ```json
//! {
//!   "packages": {
//!     "example.package": {
//!       "registries": ["scss"],
//!       "modules": {
//!         "scss": {
//!           "example/package/index": "styles/index.scss",
//!           "example/package/colors": "styles/colors.scss"
//!         }
//!       },
//!       "bundled": { "mocklib": "vendor/mocklib" }
//!     },
//!     "example.usage": { "depends": ["example.package"] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::registry::MemoryRegistry;

/// Errors raised while loading a registry manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read registry manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse registry manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageManifest {
    #[serde(default)]
    depends: Vec<String>,
    #[serde(default)]
    registries: Vec<String>,
    /// registry name -> module name -> sourcepath
    #[serde(default)]
    modules: BTreeMap<String, BTreeMap<String, PathBuf>>,
    #[serde(default)]
    bundled: BTreeMap<String, PathBuf>,
}

/// Deserialized registry manifest.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryManifest {
    #[serde(default)]
    packages: BTreeMap<String, PackageManifest>,
}

impl RegistryManifest {
    /// Load a manifest from `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(manifest)
    }

    /// Build a [`MemoryRegistry`], anchoring relative sourcepaths to
    /// `anchor` (normally the manifest's directory).
    pub fn into_registry(self, anchor: &Path) -> MemoryRegistry {
        let mut registry = MemoryRegistry::new();
        for (name, package) in self.packages {
            let depends: Vec<&str> = package.depends.iter().map(String::as_str).collect();
            let registries: Vec<&str> = package.registries.iter().map(String::as_str).collect();
            registry.declare_package(&name, &depends, &registries);

            for (registry_name, modules) in &package.modules {
                for (module, path) in modules {
                    registry.declare_module(&name, registry_name, module, anchor_path(anchor, path));
                }
            }
            for (module, path) in &package.bundled {
                registry.declare_bundle(&name, module, anchor_path(anchor, path));
            }
        }
        registry
    }
}

fn anchor_path(anchor: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        anchor.join(path)
    }
}
