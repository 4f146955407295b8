//! Sourcepath resolution across package dependency graphs.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Resolution walks the dependency graph declared by packages and merges
//! each visited package's module map into a single [`ModuleMap`]. The walk
//! is breadth-first from the requested roots (in their given order), with
//! dependencies visited in declaration order and every package visited at
//! most once, so the result is deterministic for identical input and safe
//! on cyclic graphs. When two visited packages declare the same module
//! name the later-visited package's path wins while the key keeps the
//! position of its first declaration; there is no conflict detection.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::str::FromStr;

use crate::registry::{ModuleMap, ModuleRegistry};

/// Acquisition method for registry and sourcepath resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    /// Traverse the full dependency closure of the requested packages.
    #[default]
    All,
    /// Query only the requested packages, without dependency traversal.
    Explicit,
    /// Acquire nothing. Useful for bundle-only compilations.
    None,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Method::All),
            "explicit" => Ok(Method::Explicit),
            "none" => Ok(Method::None),
            other => Err(format!(
                "unknown acquisition method '{other}' (expected all, explicit or none)"
            )),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Method::All => "all",
            Method::Explicit => "explicit",
            Method::None => "none",
        })
    }
}

/// Breadth-first dependency closure of `package_names`, each package at
/// most once, roots first in their given order.
fn dependency_closure(
    registry: &dyn ModuleRegistry,
    package_names: &[String],
) -> Vec<String> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut order = Vec::new();
    let mut queue: VecDeque<String> = package_names.iter().cloned().collect();

    while let Some(name) = queue.pop_front() {
        if !visited.insert(name.clone()) {
            continue;
        }
        for dep in registry.dependencies(&name) {
            if !visited.contains(&dep) {
                queue.push_back(dep);
            }
        }
        order.push(name);
    }

    order
}

/// Select the registries declared by `package_names` under `method`.
///
/// Returns the deduplicated registry names in discovery order. An empty
/// result is not an error; callers decide whether to warn about it.
pub fn select_registries(
    registry: &dyn ModuleRegistry,
    package_names: &[String],
    method: Method,
) -> Vec<String> {
    let packages = match method {
        Method::None => return Vec::new(),
        Method::Explicit => package_names.to_vec(),
        Method::All => dependency_closure(registry, package_names),
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();
    for package in &packages {
        for name in registry.declared_registries(package) {
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
    }
    names
}

/// Resolve the merged module-name to sourcepath mapping for
/// `package_names`, registry by registry.
///
/// When `registries` is `None`, the applicable registries are first
/// discovered via [`select_registries`] using the same `method`.
pub fn resolve_sourcepaths(
    registry: &dyn ModuleRegistry,
    package_names: &[String],
    registries: Option<&[String]>,
    method: Method,
) -> ModuleMap {
    let selected;
    let registries = match registries {
        Some(names) => names,
        None => {
            selected = select_registries(registry, package_names, method);
            &selected
        }
    };

    let packages = match method {
        Method::None => return ModuleMap::new(),
        Method::Explicit => package_names.to_vec(),
        Method::All => dependency_closure(registry, package_names),
    };

    let mut sourcepaths = ModuleMap::new();
    for registry_name in registries {
        for package in &packages {
            for (module, path) in registry.module_map(package, registry_name) {
                sourcepaths.replace(module, path);
            }
        }
    }
    sourcepaths
}

/// Resolve the merged bundle sourcepaths for `package_names`.
///
/// Bundle declarations with relative paths are anchored to `working_dir`.
pub fn resolve_bundle_sourcepaths(
    registry: &dyn ModuleRegistry,
    package_names: &[String],
    working_dir: &Path,
    method: Method,
) -> ModuleMap {
    let packages = match method {
        Method::None => return ModuleMap::new(),
        Method::Explicit => package_names.to_vec(),
        Method::All => dependency_closure(registry, package_names),
    };

    let mut bundlepaths = ModuleMap::new();
    for package in &packages {
        for (module, path) in registry.bundle_map(package) {
            let path = if path.is_absolute() {
                path
            } else {
                working_dir.join(path)
            };
            bundlepaths.replace(module, path);
        }
    }
    bundlepaths
}
