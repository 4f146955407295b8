//! End-to-end compilation tests: resolve packages from an in-memory
//! registry, run the grass toolchain, and inspect the exported CSS.
//!
//! Copyright (c) 2025 Posit, PBC

use std::fs;
use std::path::Path;

use sassy_registry::MemoryRegistry;
use sassy_toolchain::{BuildError, GrassToolchain, SpecOptions, compile_all};
use tempfile::TempDir;

fn pkgs(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Two packages in the shape of the classic integration fixture:
/// `example.package` declares an index and a colors module, and
/// `example.usage` depends on it, importing its colors from its own
/// index.
fn example_environment(root: &Path) -> MemoryRegistry {
    let package_dir = root.join("example").join("package");
    fs::create_dir_all(&package_dir).unwrap();

    let index = package_dir.join("index.scss");
    fs::write(
        &index,
        "@import \"example/package/colors\";\nbody { background-color: $theme-color; }\n",
    )
    .unwrap();

    let colors = package_dir.join("colors.scss");
    fs::write(&colors, "$theme-color: #fa3366;\n").unwrap();

    let usage_dir = root.join("example").join("usage");
    fs::create_dir_all(&usage_dir).unwrap();
    let usage_index = usage_dir.join("index.scss");
    fs::write(
        &usage_index,
        "@import \"example/package/colors\";\nbody { color: $theme-color; }\n",
    )
    .unwrap();

    let mut registry = MemoryRegistry::new();
    registry.declare_package("example.package", &[], &["scss"]);
    registry.declare_module("example.package", "scss", "example/package/index", index);
    registry.declare_module("example.package", "scss", "example/package/colors", colors);

    registry.declare_package("example.usage", &["example.package"], &["scss"]);
    registry.declare_module("example.usage", "scss", "example/usage/index", usage_index);

    registry
}

fn options_in(dir: &TempDir) -> SpecOptions {
    SpecOptions {
        working_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    }
}

#[test]
fn test_compile_single_package() {
    let dir = tempfile::tempdir().unwrap();
    let registry = example_environment(dir.path());

    let spec = compile_all(
        &registry,
        &pkgs(&["example.package"]),
        options_in(&dir),
        &GrassToolchain::new(),
    )
    .unwrap();

    assert_eq!(spec.export_target, dir.path().join("example.package.css"));
    assert_eq!(spec.entry_points, vec!["example/package/index".to_string()]);

    let css = fs::read_to_string(&spec.export_target).unwrap();
    // the variable from colors.scss was substituted into the index rule
    assert!(css.contains("background-color"), "css was: {css}");
    assert!(css.contains("#fa3366"), "css was: {css}");
}

#[test]
fn test_compile_module_with_dotted_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = MemoryRegistry::new();

    let app_dir = dir.path().join("app");
    fs::create_dir_all(&app_dir).unwrap();
    let widget = app_dir.join("jquery.ui.scss");
    fs::write(&widget, ".ui-widget { border: 1px solid; }\n").unwrap();
    let index = app_dir.join("index.scss");
    fs::write(&index, "@import \"app/jquery.ui\";\n").unwrap();

    registry.declare_package("app", &[], &["scss"]);
    registry.declare_module("app", "scss", "app/index", index);
    registry.declare_module("app", "scss", "app/jquery.ui", widget);

    let spec = compile_all(
        &registry,
        &pkgs(&["app"]),
        options_in(&dir),
        &GrassToolchain::new(),
    )
    .unwrap();

    // the dotted module's rules must make it into the export; a staging
    // mismatch would let an empty stub swallow the import instead
    let css = fs::read_to_string(&spec.export_target).unwrap();
    assert!(css.contains(".ui-widget"), "css was: {css}");
}

#[test]
fn test_compile_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let registry = example_environment(dir.path());

    let first = compile_all(
        &registry,
        &pkgs(&["example.package"]),
        options_in(&dir),
        &GrassToolchain::new(),
    )
    .unwrap();
    let first_css = fs::read(&first.export_target).unwrap();

    let second = compile_all(
        &registry,
        &pkgs(&["example.package"]),
        options_in(&dir),
        &GrassToolchain::new(),
    )
    .unwrap();
    let second_css = fs::read(&second.export_target).unwrap();

    assert!(!first_css.is_empty());
    assert_eq!(first_css, second_css);
}

#[test]
fn test_compile_dependent_package_pulls_dependency_sources() {
    let dir = tempfile::tempdir().unwrap();
    let registry = example_environment(dir.path());

    let spec = compile_all(
        &registry,
        &pkgs(&["example.usage"]),
        options_in(&dir),
        &GrassToolchain::new(),
    )
    .unwrap();

    // entry points come from explicit resolution, so the dependency's own
    // index is not an entry point even though its sources are staged
    assert_eq!(spec.entry_points, vec!["example/usage/index".to_string()]);
    assert_eq!(spec.transpile_sourcepath.len(), 3);

    let css = fs::read_to_string(&spec.export_target).unwrap();
    assert!(css.contains("#fa3366"));
    assert!(!css.contains("background-color"));
}

#[test]
fn test_compile_with_explicit_entry_points() {
    let dir = tempfile::tempdir().unwrap();
    let registry = example_environment(dir.path());

    let options = SpecOptions {
        entry_points: vec!["example/package/colors".to_string()],
        ..options_in(&dir)
    };
    let spec = compile_all(
        &registry,
        &pkgs(&["example.package"]),
        options,
        &GrassToolchain::new(),
    )
    .unwrap();

    // colors.scss only defines a variable, so the export is empty css
    let css = fs::read_to_string(&spec.export_target).unwrap();
    assert!(!css.contains("body"));
}

#[test]
fn test_compile_minified() {
    let dir = tempfile::tempdir().unwrap();
    let registry = example_environment(dir.path());

    let spec = compile_all(
        &registry,
        &pkgs(&["example.package"]),
        options_in(&dir),
        &GrassToolchain::minified(),
    )
    .unwrap();

    let css = fs::read_to_string(&spec.export_target).unwrap();
    assert!(css.contains("#fa3366"));
    assert!(!css.contains("\n\n"));
}

#[test]
fn test_bundle_import_resolves_through_stub() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = example_environment(dir.path());

    // a vendored library registered at directory granularity; the index
    // imports a file nested inside it that only the stub can resolve
    let vendor_dir = dir.path().join("vendor").join("mocklib");
    fs::create_dir_all(&vendor_dir).unwrap();

    let app_dir = dir.path().join("app");
    fs::create_dir_all(&app_dir).unwrap();
    let app_index = app_dir.join("index.scss");
    fs::write(
        &app_index,
        "@import \"mocklib/sub/part\";\n.app { display: block; }\n",
    )
    .unwrap();

    registry.declare_package("app", &[], &["scss"]);
    registry.declare_module("app", "scss", "app/index", app_index);
    registry.declare_bundle("app", "mocklib", "vendor/mocklib");

    let spec = compile_all(
        &registry,
        &pkgs(&["app"]),
        options_in(&dir),
        &GrassToolchain::new(),
    )
    .unwrap();

    let css = fs::read_to_string(&spec.export_target).unwrap();
    assert!(css.contains(".app"));
}

#[test]
fn test_unresolved_import_fails_link() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = MemoryRegistry::new();

    let app_dir = dir.path().join("app");
    fs::create_dir_all(&app_dir).unwrap();
    let app_index = app_dir.join("index.scss");
    fs::write(&app_index, "@import \"no/such/module\";\n").unwrap();

    registry.declare_package("app", &[], &["scss"]);
    registry.declare_module("app", "scss", "app/index", app_index);

    let err = compile_all(
        &registry,
        &pkgs(&["app"]),
        options_in(&dir),
        &GrassToolchain::new(),
    )
    .unwrap_err();

    assert!(matches!(err, BuildError::CompilationFailed { .. }));
}

#[test]
fn test_link_failure_leaves_export_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = MemoryRegistry::new();

    let app_dir = dir.path().join("app");
    fs::create_dir_all(&app_dir).unwrap();
    let app_index = app_dir.join("index.scss");
    fs::write(&app_index, "@import \"no/such/module\";\n").unwrap();

    registry.declare_package("app", &[], &["scss"]);
    registry.declare_module("app", "scss", "app/index", app_index);

    let export_target = dir.path().join("app.css");
    let options = SpecOptions {
        export_target: Some(export_target.clone()),
        ..options_in(&dir)
    };
    compile_all(&registry, &pkgs(&["app"]), options, &GrassToolchain::new()).unwrap_err();
    assert!(!export_target.exists());
}

#[test]
fn test_no_sources_is_fatal_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = MemoryRegistry::new();
    registry.declare_package("barren", &[], &[]);

    let err = compile_all(
        &registry,
        &pkgs(&["barren"]),
        options_in(&dir),
        &GrassToolchain::new(),
    )
    .unwrap_err();

    assert!(matches!(err, BuildError::NoSources { .. }));
    assert!(!dir.path().join("barren.css").exists());
}

#[test]
fn test_entry_file_does_not_collide_with_staged_module() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = MemoryRegistry::new();

    // a package whose module is named like the synthetic entry file
    let src = dir.path().join("sassy.scss");
    fs::write(&src, ".clash { color: teal; }\n").unwrap();
    let index = dir.path().join("index.scss");
    fs::write(&index, "@import \"sassy\";\n").unwrap();

    registry.declare_package("clash", &[], &["scss"]);
    registry.declare_module("clash", "scss", "sassy", src);
    registry.declare_module("clash", "scss", "clash/index", index);

    let spec = compile_all(
        &registry,
        &pkgs(&["clash"]),
        options_in(&dir),
        &GrassToolchain::new(),
    )
    .unwrap();

    let css = fs::read_to_string(&spec.export_target).unwrap();
    assert!(css.contains(".clash"));
}
