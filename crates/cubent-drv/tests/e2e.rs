//! Whole-pipeline tests covering end-to-end compile scenarios, grounded on
//! `faxc-drv/tests/integration_test.rs`'s style of driving a `Session`
//! directly and `faxt/src/commands/build.rs`'s `tempfile::TempDir` harness.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use cubent_drv::{Config, DriverError, Session, StaticVersionInfoProvider, VersionSpec};
use cubent_util::span::SourceMap;
use cubent_util::{CompileError, Handler};

fn write_source(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn compile(sources: Vec<PathBuf>, out: PathBuf, version: &str) -> Result<(), DriverError> {
    let config = Config {
        out,
        version: VersionSpec::parse(version).unwrap(),
        icon: None,
        description: "test pack".to_string(),
        sources,
        verbose: false,
    };
    let provider = StaticVersionInfoProvider::new();
    let session = Session::new(config, &provider);
    let handler = Handler::new();
    let mut sources_map = SourceMap::new();
    session.compile(&handler, &mut sources_map)
}

#[test]
fn empty_namespace_produces_pack_meta_with_no_functions() {
    let src_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let out_dir_path = out_root.path().join("pack");
    write_source(&src_dir, "empty.cubent", "namespace demo {}\n");

    compile(vec![src_dir.path().to_path_buf()], out_dir_path.clone(), "1.20.1").unwrap();

    assert!(out_dir_path.join("pack.mcmeta").exists());
    assert!(!out_dir_path.join("data/demo/functions").exists());
}

#[test]
fn hello_world_function_is_emitted_under_its_namespace() {
    let src_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let out_dir_path = out_root.path().join("pack");
    write_source(
        &src_dir,
        "main.cubent",
        "namespace demo { function main(): Void { var x = 1 + 2; } }\n",
    );

    compile(vec![src_dir.path().to_path_buf()], out_dir_path.clone(), "1.20.1").unwrap();

    let generated = out_dir_path.join("data/demo/functions/main.mcfunction");
    assert!(generated.exists());
    let text = fs::read_to_string(generated).unwrap();
    assert!(text.contains("scoreboard objectives add"));
}

#[test]
fn if_block_produces_a_helper_function_file() {
    let src_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let out_dir_path = out_root.path().join("pack");
    write_source(
        &src_dir,
        "main.cubent",
        "namespace demo { function main(): Void { if (true) { var x = 1; } } }\n",
    );

    compile(vec![src_dir.path().to_path_buf()], out_dir_path.clone(), "1.20.1").unwrap();

    let build_dirs: Vec<_> = fs::read_dir(out_dir_path.join("data"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name != "demo")
        .collect();
    assert_eq!(build_dirs.len(), 1, "expected exactly one build-uuid directory for the helper function");
    let helper_dir = out_dir_path.join("data").join(&build_dirs[0]).join("functions");
    let helpers: Vec<_> = fs::read_dir(helper_dir).unwrap().collect();
    assert_eq!(helpers.len(), 1);
}

#[test]
fn type_error_fails_the_compile_without_writing_output() {
    let src_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let out_dir_path = out_root.path().join("pack");
    write_source(
        &src_dir,
        "main.cubent",
        "namespace demo { function main(): Void { var x = 1; x = \"oops\"; } }\n",
    );

    let result = compile(vec![src_dir.path().to_path_buf()], out_dir_path.clone(), "1.20.1");

    assert!(matches!(result, Err(DriverError::CompileFailed(_))));
    assert!(!out_dir_path.join("pack.mcmeta").exists());
}

#[test]
fn version_below_minimum_is_rejected_before_any_file_io() {
    let src_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let out_dir_path = out_root.path().join("pack");
    // A source file that would fail to parse if the driver ever got far
    // enough to read it — proves the version gate runs first.
    write_source(&src_dir, "main.cubent", "this is not valid cubent syntax at all (((");

    let result = compile(vec![src_dir.path().to_path_buf()], out_dir_path.clone(), "1.13.0");

    assert!(matches!(result, Err(DriverError::Compile(CompileError::Config { .. }))));
    assert!(!out_dir_path.exists());
}

#[test]
fn latest_keyword_resolves_to_the_providers_newest_version() {
    let src_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let out_dir_path = out_root.path().join("pack");
    write_source(&src_dir, "main.cubent", "namespace demo {}\n");

    compile(vec![src_dir.path().to_path_buf()], out_dir_path.clone(), "latest").unwrap();

    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir_path.join("pack.mcmeta")).unwrap()).unwrap();
    assert_eq!(meta["pack"]["pack_format"], 26);
}

#[test]
fn external_mcfunction_declaration_copies_its_backing_file() {
    let src_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let out_dir_path = out_root.path().join("pack");
    write_source(
        &src_dir,
        "main.cubent",
        "namespace demo { mcfunction \"minecraft:reload\" reload(): Void; }\n",
    );
    let backing_dir = src_dir.path().join("minecraft");
    fs::create_dir_all(&backing_dir).unwrap();
    fs::write(backing_dir.join("reload.mcfunction"), "reload\n").unwrap();

    compile(vec![src_dir.path().to_path_buf()], out_dir_path.clone(), "1.20.1").unwrap();

    let copied = out_dir_path.join("data/minecraft/functions/reload.mcfunction");
    assert!(copied.exists());
    assert_eq!(fs::read_to_string(copied).unwrap(), "reload\n");
}
