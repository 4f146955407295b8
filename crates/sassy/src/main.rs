//! sassy CLI - Main entry point

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sassy_registry::{MemoryRegistry, Method, RegistryManifest, resolve_sourcepaths};
use sassy_toolchain::{SpecOptions, compile_all, toolchain_for};

#[derive(Parser)]
#[command(name = "sassy")]
#[command(version)]
#[command(about = "Bundle and compile SCSS declared by packages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the styling declared by the given packages into one CSS file
    Build {
        /// Packages to source the styling from
        packages: Vec<String>,

        /// Registry manifest declaring packages and their sources
        #[arg(long, default_value = "sassy.json")]
        manifest: PathBuf,

        /// Output filename; defaults to the last package name with a .css suffix
        #[arg(short = 'o', long)]
        export_target: Option<PathBuf>,

        /// Working directory; anchors relative bundle paths and the default export
        #[arg(long)]
        working_dir: Option<PathBuf>,

        /// Build directory; defaults to a temporary directory removed when done
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Registry to gather sources from; repeatable, auto-selected when omitted
        #[arg(long = "source-registry")]
        source_registries: Vec<String>,

        /// Acquisition method for the registries declared by the packages
        #[arg(long, default_value = "all")]
        source_registry_method: Method,

        /// Acquisition method for module-to-sourcepath mappings
        #[arg(long, default_value = "all")]
        sourcepath_method: Method,

        /// Acquisition method for bundled (vendored) sourcepaths
        #[arg(long, default_value = "all")]
        bundlepath_method: Method,

        /// Entry-point module; repeatable, derived from index.scss files when omitted
        #[arg(long = "entry-point")]
        entry_points: Vec<String>,

        /// Stylesheet compiler to link with
        #[arg(long, default_value = "grass")]
        compiler: String,

        /// Produce compressed output
        #[arg(long)]
        minified: bool,
    },

    /// Print the resolved module-to-sourcepath mapping for the given packages
    Modules {
        /// Packages to resolve
        packages: Vec<String>,

        /// Registry manifest declaring packages and their sources
        #[arg(long, default_value = "sassy.json")]
        manifest: PathBuf,

        /// Acquisition method for module-to-sourcepath mappings
        #[arg(long, default_value = "all")]
        sourcepath_method: Method,
    },
}

fn load_registry(manifest: &Path) -> Result<MemoryRegistry> {
    let anchor = match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let registry = RegistryManifest::load(manifest)
        .with_context(|| format!("loading registry manifest {}", manifest.display()))?
        .into_registry(&anchor);
    Ok(registry)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sassy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            packages,
            manifest,
            export_target,
            working_dir,
            build_dir,
            source_registries,
            source_registry_method,
            sourcepath_method,
            bundlepath_method,
            entry_points,
            compiler,
            minified,
        } => {
            let registry = load_registry(&manifest)?;
            let toolchain = toolchain_for(&compiler, minified)?;
            tracing::debug!(compiler = %compiler, minified, "selected toolchain");
            let options = SpecOptions {
                export_target,
                working_dir,
                build_dir,
                source_registries: if source_registries.is_empty() {
                    None
                } else {
                    Some(source_registries)
                },
                source_registry_method,
                sourcepath_method,
                bundlepath_method,
                entry_points,
            };

            let spec = compile_all(&registry, &packages, options, toolchain.as_ref())
                .context("compilation failed")?;
            println!("{}", spec.export_target.display());
            Ok(())
        }

        Commands::Modules {
            packages,
            manifest,
            sourcepath_method,
        } => {
            let registry = load_registry(&manifest)?;
            let sourcepaths = resolve_sourcepaths(&registry, &packages, None, sourcepath_method);
            for (module, path) in &sourcepaths {
                println!("{module} -> {}", path.display());
            }
            Ok(())
        }
    }
}
