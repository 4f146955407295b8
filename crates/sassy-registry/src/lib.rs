//! Module registries and sourcepath resolution for sassy.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides:
//! - The `ModuleMap` type: logical module names mapped to source files
//! - The `ModuleRegistry` trait: the interface packages declare their
//!   stylesheet sources, dependencies and registries through
//! - `MemoryRegistry`: an in-memory registry, built programmatically or
//!   loaded from a JSON manifest
//! - Sourcepath resolution: dependency-closure traversal that merges the
//!   module maps of a set of packages into a single mapping

mod manifest;
mod registry;
mod resolve;

pub use manifest::{ManifestError, RegistryManifest};
pub use registry::{MemoryRegistry, ModuleMap, ModuleRegistry};
pub use resolve::{
    Method, resolve_bundle_sourcepaths, resolve_sourcepaths, select_registries,
};
