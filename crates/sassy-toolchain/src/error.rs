//! Error types for the build pipeline.
//!
//! Copyright (c) 2025 Posit, PBC

use thiserror::Error;

/// Errors that can occur while building a CSS artifact.
///
/// Any failure aborts the pipeline immediately; staged build-directory
/// content is left in place for inspection.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The requested stylesheet compiler is not available.
    #[error("scss compiler '{0}' is not available")]
    CompilerUnavailable(String),

    /// The compiler rejected the assembled sources.
    #[error("scss compilation failed: {message}")]
    CompilationFailed { message: String },

    /// A package-to-export compilation was requested but resolution
    /// produced no sources at all.
    #[error("no scss sources found for packages {packages:?}")]
    NoSources { packages: Vec<String> },

    /// File I/O failure while staging, assembling or exporting.
    #[error("build i/o error: {0}")]
    Io(#[from] std::io::Error),
}
