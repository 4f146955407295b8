//! Build specs.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A [`BuildSpec`] is the single piece of shared mutable state threaded
//! through the pipeline: resolution fills it in, each toolchain state
//! mutates it in place, and the caller inspects it afterwards. It is not
//! designed for concurrent access; parallel builds need independent specs
//! with independent build directories.

use std::collections::BTreeSet;
use std::path::PathBuf;

use hashlink::LinkedHashMap;
use sassy_registry::ModuleMap;
use tempfile::TempDir;

/// Configuration and results of one compilation request.
#[derive(Debug)]
pub struct BuildSpec {
    /// Root package names the compilation was requested for.
    pub package_names: Vec<String>,
    /// Registries the sourcepaths were resolved from.
    pub registry_names: Vec<String>,
    /// Anchor for relative bundle paths and the default export target.
    pub working_dir: PathBuf,
    /// Where sources are staged and the entry file is assembled.
    pub build_dir: PathBuf,
    /// The file the compiled CSS is written to.
    pub export_target: PathBuf,
    /// Merged module name -> original source file mapping.
    pub transpile_sourcepath: ModuleMap,
    /// Bundled (vendored) module name -> path mapping.
    pub bundle_sourcepath: ModuleMap,
    /// Module name -> staged path relative to `build_dir`, recorded by the
    /// stage state.
    pub transpiled_targetpaths: LinkedHashMap<String, PathBuf>,
    /// Module names imported by the synthetic entry sourcefile.
    pub entry_points: Vec<String>,
    /// Path of the assembled entry sourcefile, recorded by the assemble
    /// state.
    pub entry_point_sourcefile: Option<PathBuf>,
    /// Owns the build directory when it is ephemeral, so it is removed on
    /// every exit path once the spec is dropped.
    _build_root: Option<TempDir>,
}

impl BuildSpec {
    /// Create a spec with empty sourcepaths.
    ///
    /// When `build_dir` is `None` a temporary directory is allocated and
    /// tied to the lifetime of the spec.
    pub fn new(
        package_names: Vec<String>,
        registry_names: Vec<String>,
        working_dir: PathBuf,
        build_dir: Option<PathBuf>,
        export_target: PathBuf,
    ) -> std::io::Result<Self> {
        let (build_dir, build_root) = match build_dir {
            Some(dir) => (dir, None),
            None => {
                let root = tempfile::Builder::new().prefix("sassy-build-").tempdir()?;
                (root.path().to_path_buf(), Some(root))
            }
        };

        Ok(Self {
            package_names,
            registry_names,
            working_dir,
            build_dir,
            export_target,
            transpile_sourcepath: ModuleMap::new(),
            bundle_sourcepath: ModuleMap::new(),
            transpiled_targetpaths: LinkedHashMap::new(),
            entry_points: Vec::new(),
            entry_point_sourcefile: None,
            _build_root: build_root,
        })
    }

    /// Union of the transpiled and bundled sourcepaths, used by the stub
    /// import resolver during linking.
    pub fn sourcepath_merged(&self) -> ModuleMap {
        let mut merged = self.transpile_sourcepath.clone();
        for (module, path) in &self.bundle_sourcepath {
            merged.replace(module.clone(), path.clone());
        }
        merged
    }

    /// The module names compiled as part of this run.
    pub fn export_module_names(&self) -> BTreeSet<String> {
        self.transpile_sourcepath.keys().cloned().collect()
    }
}
