/*
 * toolchain.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The build pipeline state machine and its grass implementation.
 */

//! Toolchains.
//!
//! A toolchain runs four states, strictly in order, each invoked once
//! with the shared [`BuildSpec`]:
//!
//! 1. **prepare**: validate preconditions, fail fatally if unmet
//! 2. **stage_sources**: copy every resolved source into the build
//!    directory, mirroring module-name segments as path segments
//! 3. **assemble**: write the synthetic entry sourcefile importing the
//!    entry-point modules
//! 4. **link**: compile the entry sourcefile and write the export target
//!
//! Failure in any state halts the rest; staged content is left on disk
//! for inspection. Staging and assembly are compiler-independent and come
//! as default implementations; a concrete toolchain per supported
//! compiler supplies `prepare` and `link`, and [`toolchain_for`] selects
//! one by name.

use std::fs;
use std::path::PathBuf;

use grass::OutputStyle;

use crate::error::BuildError;
use crate::spec::BuildSpec;
use crate::stub::{StubFs, StubResolver};

/// Filename suffix of the stylesheet sources this pipeline handles.
pub const SOURCE_SUFFIX: &str = "scss";

/// Reserved build subdirectory holding the synthetic entry sourcefile.
///
/// The entry file lives in its own subdirectory rather than the build
/// root so it can never collide with a staged module of the same name.
pub const ENTRY_POINT_DIRNAME: &str = "__sassy__";

/// Base name of the synthetic entry sourcefile.
pub const ENTRY_POINT_BASENAME: &str = "sassy";

/// The build pipeline state machine.
pub trait Toolchain {
    /// Validate preconditions; a failure here aborts the whole build.
    fn prepare(&self, spec: &mut BuildSpec) -> Result<(), BuildError>;

    /// Copy every resolved source into the build directory.
    ///
    /// The staged path mirrors the module name's segments with the
    /// stylesheet suffix appended; `example/package/index` lands at
    /// `{build_dir}/example/package/index.scss`. Content is copied as-is.
    /// Each staged relative path is recorded in
    /// `spec.transpiled_targetpaths`.
    fn stage_sources(&self, spec: &mut BuildSpec) -> Result<(), BuildError> {
        let sources: Vec<(String, PathBuf)> = spec
            .transpile_sourcepath
            .iter()
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect();

        for (module, source) in sources {
            // suffix is appended, so a dotted final segment such as
            // app/jquery.ui stages as app/jquery.ui.scss
            let relative: PathBuf = format!("{module}.{SOURCE_SUFFIX}").split('/').collect();

            let target = spec.build_dir.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&source, &target)?;
            tracing::debug!(module = %module, staged = %target.display(), "staged source");
            spec.transpiled_targetpaths.insert(module, relative);
        }
        Ok(())
    }

    /// Write the synthetic entry sourcefile.
    ///
    /// One `@import "{module}";` line per entry point, in order,
    /// referencing the module name verbatim. Re-invocation overwrites the
    /// file. The written path is recorded in
    /// `spec.entry_point_sourcefile`.
    fn assemble(&self, spec: &mut BuildSpec) -> Result<(), BuildError> {
        let entry_dir = spec.build_dir.join(ENTRY_POINT_DIRNAME);
        fs::create_dir_all(&entry_dir)?;
        let path = entry_dir.join(format!("{ENTRY_POINT_BASENAME}.{SOURCE_SUFFIX}"));

        let mut source = String::new();
        for entry_point in &spec.entry_points {
            source.push_str(&format!("@import \"{entry_point}\";\n"));
        }
        fs::write(&path, source)?;
        tracing::debug!(path = %path.display(), entry_points = spec.entry_points.len(), "assembled entry sourcefile");
        spec.entry_point_sourcefile = Some(path);
        Ok(())
    }

    /// Compile the assembled entry sourcefile and write the export
    /// target. The export target is left untouched when compilation
    /// fails.
    fn link(&self, spec: &mut BuildSpec) -> Result<(), BuildError>;

    /// Run the full pipeline: prepare, stage, assemble, link.
    fn execute(&self, spec: &mut BuildSpec) -> Result<(), BuildError> {
        self.prepare(spec)?;
        self.stage_sources(spec)?;
        self.assemble(spec)?;
        self.link(spec)
    }
}

/// Toolchain linking with grass, the pure-Rust SCSS compiler.
#[derive(Debug, Default)]
pub struct GrassToolchain {
    minified: bool,
}

impl GrassToolchain {
    /// A toolchain producing expanded CSS.
    pub fn new() -> Self {
        Self::default()
    }

    /// A toolchain producing compressed CSS.
    pub fn minified() -> Self {
        Self { minified: true }
    }
}

impl Toolchain for GrassToolchain {
    fn prepare(&self, spec: &mut BuildSpec) -> Result<(), BuildError> {
        // grass is linked in, so the compiler itself needs no probing;
        // the build directory is the only precondition
        fs::create_dir_all(&spec.build_dir)?;
        Ok(())
    }

    fn link(&self, spec: &mut BuildSpec) -> Result<(), BuildError> {
        let entry = spec
            .entry_point_sourcefile
            .clone()
            .ok_or_else(|| BuildError::CompilationFailed {
                message: "entry point sourcefile was never assembled".to_string(),
            })?;
        // the on-disk entry file is authoritative, not the spec fields
        let source = fs::read_to_string(&entry)?;

        let resolver = StubResolver::new(spec.export_module_names(), spec.sourcepath_merged());
        let stub_fs = StubFs::new(&spec.build_dir, &resolver);

        let style = if self.minified {
            OutputStyle::Compressed
        } else {
            OutputStyle::Expanded
        };
        let load_paths = [spec.build_dir.clone()];
        let options = grass::Options::default()
            .fs(&stub_fs)
            .load_paths(&load_paths)
            .style(style);

        let css = grass::from_string(source, &options).map_err(|e| {
            BuildError::CompilationFailed {
                message: e.to_string(),
            }
        })?;

        fs::write(&spec.export_target, css)?;
        tracing::info!(export_target = %spec.export_target.display(), "wrote css export");
        Ok(())
    }
}

/// Select a toolchain implementation by compiler name.
///
/// `grass` is currently the only supported compiler; unknown names fail
/// with [`BuildError::CompilerUnavailable`].
pub fn toolchain_for(compiler: &str, minified: bool) -> Result<Box<dyn Toolchain>, BuildError> {
    match compiler {
        "grass" => Ok(Box::new(if minified {
            GrassToolchain::minified()
        } else {
            GrassToolchain::new()
        })),
        other => Err(BuildError::CompilerUnavailable(other.to_string())),
    }
}
