//! Stub import resolution.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Bundled (vendored) sources are registered at coarse granularity: a
//! whole directory under one module name. Import statements inside the
//! compiled sources still reference individual files nested within such a
//! bundle, so the compiler's own resolution cannot find them in the build
//! directory. The [`StubResolver`] recognizes those targets by declared
//! path prefix and synthesizes an empty pass-through import for them; the
//! [`StubFs`] adapter exposes that behavior to grass through its
//! filesystem hook.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::io;
use std::path::Path;

use sassy_registry::ModuleMap;

/// A synthesized resolution for an import target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubImport {
    /// The import target as requested.
    pub name: String,
    /// Replacement content; empty for pass-through stubs.
    pub content: String,
}

/// Resolves import targets that the compiler cannot find on disk.
pub struct StubResolver {
    export_module_names: BTreeSet<String>,
    sourcepath_merged: ModuleMap,
}

impl StubResolver {
    pub fn new(export_module_names: BTreeSet<String>, sourcepath_merged: ModuleMap) -> Self {
        Self {
            export_module_names,
            sourcepath_merged,
        }
    }

    /// Resolve `target`, an import name as written in the source.
    ///
    /// - Targets compiled as part of this run resolve to `None`: the
    ///   compiler's native resolution already handles them.
    /// - Exact keys of the merged sourcepath resolve to an empty stub.
    /// - Otherwise the last `/`-delimited segment is stripped repeatedly,
    ///   one segment at a time; the first shortened form found in the
    ///   merged sourcepath yields an empty stub for the original target.
    /// - `None` when every prefix misses; the compiler raises its own
    ///   import error.
    pub fn resolve(&self, target: &str) -> Option<StubImport> {
        if self.export_module_names.contains(target) {
            return None;
        }
        if self.sourcepath_merged.contains_key(target) {
            return Some(StubImport {
                name: target.to_string(),
                content: String::new(),
            });
        }

        let mut prefix = target;
        while let Some(idx) = prefix.rfind('/') {
            prefix = &prefix[..idx];
            if self.sourcepath_merged.contains_key(prefix) {
                tracing::info!(import = target, source = prefix, "generating stub import");
                return Some(StubImport {
                    name: target.to_string(),
                    content: String::new(),
                });
            }
        }
        None
    }
}

impl Debug for StubResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubResolver")
            .field("export_module_names", &self.export_module_names.len())
            .field("sourcepath_merged", &self.sourcepath_merged.len())
            .finish()
    }
}

/// Adapter that implements `grass::Fs` over the real filesystem with
/// stub-import fallback.
///
/// grass resolves an `@import` by probing candidate paths (plain,
/// partial-underscore and index forms) against its load paths. Probes that
/// hit real files in the build directory behave normally; probes that miss
/// are mapped back to the module name they stand for and offered to the
/// [`StubResolver`].
pub struct StubFs<'a> {
    build_dir: &'a Path,
    resolver: &'a StubResolver,
}

impl<'a> StubFs<'a> {
    pub fn new(build_dir: &'a Path, resolver: &'a StubResolver) -> Self {
        Self { build_dir, resolver }
    }

    /// Map a probed path back to the module name it stands for, and
    /// resolve it as a stub. Only `.scss` probes under the build directory
    /// participate.
    fn stub_for(&self, path: &Path) -> Option<StubImport> {
        let rel = path.strip_prefix(self.build_dir).ok()?;
        if rel.extension()? != "scss" {
            return None;
        }
        let stem = rel.file_stem()?.to_str()?;
        // a partial probe stands for the same module as its plain form
        let stem = stem.strip_prefix('_').unwrap_or(stem);

        let mut segments: Vec<&str> = Vec::new();
        if let Some(parent) = rel.parent() {
            for component in parent.components() {
                segments.push(component.as_os_str().to_str()?);
            }
        }
        segments.push(stem);
        self.resolver.resolve(&segments.join("/"))
    }
}

impl Debug for StubFs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubFs")
            .field("build_dir", &self.build_dir)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl grass::Fs for StubFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file() || self.stub_for(path).is_some()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if path.is_file() {
            return std::fs::read(path);
        }
        match self.stub_for(path) {
            Some(stub) => Ok(stub.content.into_bytes()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )),
        }
    }
}
