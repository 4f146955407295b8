//! SCSS build pipeline for sassy.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate turns the module maps resolved by `sassy-registry` into a
//! single compiled CSS artifact. The pipeline has four states, run
//! strictly in order with no retry: prepare (preconditions), stage
//! (copy sources into the build directory), assemble (write the synthetic
//! entry sourcefile) and link (compile with grass and write the export
//! target).
//!
//! The usual entry point is [`compile_all`]:
//!
//! ```rust,ignore
//! use sassy_toolchain::{GrassToolchain, SpecOptions, compile_all};
//!
//! let toolchain = GrassToolchain::new();
//! let spec = compile_all(&registry, &packages, SpecOptions::default(), &toolchain)?;
//! println!("wrote {}", spec.export_target.display());
//! ```

mod build;
mod error;
mod spec;
mod stub;
mod toolchain;

pub use build::{SpecOptions, compile_all, create_spec, derive_entry_points};
pub use error::BuildError;
pub use spec::BuildSpec;
pub use stub::{StubFs, StubImport, StubResolver};
pub use toolchain::{
    ENTRY_POINT_BASENAME, ENTRY_POINT_DIRNAME, GrassToolchain, SOURCE_SUFFIX, Toolchain,
    toolchain_for,
};
