/*
 * build.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Spec construction and the package-to-export orchestration entry point.
 */

//! Spec construction and orchestration.
//!
//! [`create_spec`] resolves everything a toolchain run needs into a
//! [`BuildSpec`]: the registries to query, the merged sourcepaths and
//! the entry points. [`compile_all`] wraps that with the no-sources
//! check and runs the toolchain.

use std::ffi::OsStr;
use std::path::PathBuf;

use sassy_registry::{
    Method, ModuleRegistry, resolve_bundle_sourcepaths, resolve_sourcepaths, select_registries,
};

use crate::error::BuildError;
use crate::spec::BuildSpec;
use crate::toolchain::Toolchain;

/// Reserved basename marking a package's styling entry point.
const INDEX_BASENAME: &str = "index.scss";

/// Export filename used when no packages are given.
const DEFAULT_EXPORT_BASENAME: &str = "sassy.export.css";

/// Knobs for [`create_spec`].
#[derive(Debug, Clone, Default)]
pub struct SpecOptions {
    /// Output file; defaults to `{working_dir}/{last package}.css`.
    pub export_target: Option<PathBuf>,
    /// Anchor for relative paths; defaults to the current directory.
    pub working_dir: Option<PathBuf>,
    /// Build directory; defaults to an ephemeral directory removed when
    /// the spec is dropped.
    pub build_dir: Option<PathBuf>,
    /// Registries to query; discovered from the packages when `None`.
    pub source_registries: Option<Vec<String>>,
    /// Acquisition method for registry discovery.
    pub source_registry_method: Method,
    /// Acquisition method for module sourcepaths.
    pub sourcepath_method: Method,
    /// Acquisition method for bundled sourcepaths.
    pub bundlepath_method: Method,
    /// Entry-point modules; derived from `index.scss` basenames when
    /// empty.
    pub entry_points: Vec<String>,
}

/// Determine the entry-point modules for a compilation.
///
/// An explicit non-empty list is used verbatim; nothing checks that the
/// named modules exist, a bad name simply surfaces as an unresolved
/// import at link time. Otherwise the sourcepaths are re-resolved with
/// [`Method::Explicit`] and every module backed by an `index.scss` file
/// is selected, in map iteration order. Explicit resolution keeps
/// dependency packages' own index files from becoming false positives.
pub fn derive_entry_points(
    explicit: &[String],
    registry: &dyn ModuleRegistry,
    package_names: &[String],
    registries: &[String],
) -> Vec<String> {
    if !explicit.is_empty() {
        tracing::debug!(entry_points = ?explicit, "using provided entry points");
        return explicit.to_vec();
    }

    let derived: Vec<String> =
        resolve_sourcepaths(registry, package_names, Some(registries), Method::Explicit)
            .iter()
            .filter(|(_, path)| path.file_name() == Some(OsStr::new(INDEX_BASENAME)))
            .map(|(module, _)| module.clone())
            .collect();
    tracing::debug!(entry_points = ?derived, "derived entry points");
    derived
}

/// Resolve a [`BuildSpec`] for compiling the styling of `package_names`.
pub fn create_spec(
    registry: &dyn ModuleRegistry,
    package_names: &[String],
    options: SpecOptions,
) -> Result<BuildSpec, BuildError> {
    let working_dir = match options.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let export_target = options.export_target.unwrap_or_else(|| {
        match package_names.last() {
            Some(package) => working_dir.join(format!("{package}.css")),
            None => working_dir.join(DEFAULT_EXPORT_BASENAME),
        }
    });

    let registries = match options.source_registries {
        Some(names) => {
            tracing::info!(registries = ?names, "using manually specified registries");
            names
        }
        None => {
            let names =
                select_registries(registry, package_names, options.source_registry_method);
            if !names.is_empty() {
                tracing::info!(registries = ?names, "automatically picked registries");
            } else if !package_names.is_empty() {
                tracing::warn!(
                    packages = ?package_names,
                    method = %options.source_registry_method,
                    "no module registry declarations found for the requested packages"
                );
            } else {
                tracing::warn!("no packages and no registries specified");
            }
            names
        }
    };

    let mut spec = BuildSpec::new(
        package_names.to_vec(),
        registries.clone(),
        working_dir,
        options.build_dir,
        export_target,
    )?;

    spec.transpile_sourcepath = resolve_sourcepaths(
        registry,
        package_names,
        Some(&registries),
        options.sourcepath_method,
    );
    spec.bundle_sourcepath = resolve_bundle_sourcepaths(
        registry,
        package_names,
        &spec.working_dir,
        options.bundlepath_method,
    );
    spec.entry_points =
        derive_entry_points(&options.entry_points, registry, package_names, &registries);

    Ok(spec)
}

/// Compile everything `package_names` declare into a single CSS export.
///
/// A non-empty package request that resolves to zero sources is promoted
/// to [`BuildError::NoSources`] rather than silently producing an empty
/// export; an empty result is accepted only when the caller explicitly
/// asked for no sources via [`Method::None`] on both path methods.
///
/// Returns the spec for inspection of targets and staged paths.
pub fn compile_all(
    registry: &dyn ModuleRegistry,
    package_names: &[String],
    options: SpecOptions,
    toolchain: &dyn Toolchain,
) -> Result<BuildSpec, BuildError> {
    let sources_requested = options.sourcepath_method != Method::None
        || options.bundlepath_method != Method::None;

    let mut spec = create_spec(registry, package_names, options)?;

    if sources_requested
        && !package_names.is_empty()
        && spec.transpile_sourcepath.is_empty()
        && spec.bundle_sourcepath.is_empty()
    {
        return Err(BuildError::NoSources {
            packages: package_names.to_vec(),
        });
    }

    toolchain.execute(&mut spec)?;
    Ok(spec)
}
