//! Output-directory assembly (spec §6): wipes and recreates `out`, writes
//! `pack.mcmeta`, copies the pack icon (falling back to a bundled default
//! on a missing path, spec §7's one locally-recovered IOError case), and
//! lays out every generated `.mcfunction` file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use cubent_emit::EmitOutput;
use cubent_par::{Function, FunctionTable};

use crate::error::{DriverError, DriverResult};

const DEFAULT_ICON: &[u8] = include_bytes!("../assets/pack.png");

#[derive(Serialize)]
struct PackMeta {
    pack: PackSection,
}

#[derive(Serialize)]
struct PackSection {
    pack_format: u32,
    description: String,
}

pub struct AssembleOptions<'a> {
    pub out: &'a Path,
    pub build_uuid: &'a str,
    pub pack_format: u32,
    pub description: &'a str,
    pub icon: Option<&'a Path>,
}

/// Writes the complete datapack tree. `functions` holds the source
/// directory's own declared functions so external (`mcfunction`)
/// declarations can be copied into `data/<namespace>/functions/` alongside
/// the generated ones (spec §8 scenario 4). `source_roots` are the
/// `-s/--source` directories, searched in order for each external's
/// backing file, matching `original_source/src/compiler.py`'s
/// `source_path` loop.
pub fn assemble(
    options: &AssembleOptions,
    emit: &EmitOutput,
    functions: &FunctionTable,
    source_roots: &[PathBuf],
) -> DriverResult<()> {
    if options.out.exists() {
        fs::remove_dir_all(options.out)
            .map_err(|e| DriverError::io(format!("clearing output directory: {e}")))?;
    }
    fs::create_dir_all(options.out).map_err(|e| DriverError::io(format!("creating output directory: {e}")))?;

    write_pack_meta(options)?;
    write_icon(options)?;
    write_user_functions(options.out, emit)?;
    write_internal_functions(options.out, options.build_uuid, emit)?;
    write_external_functions(options.out, source_roots, functions)?;

    Ok(())
}

fn write_pack_meta(options: &AssembleOptions) -> DriverResult<()> {
    let meta = PackMeta {
        pack: PackSection { pack_format: options.pack_format, description: options.description.to_string() },
    };
    let json = serde_json::to_string_pretty(&meta)
        .map_err(|e| DriverError::io(format!("encoding pack.mcmeta: {e}")))?;
    fs::write(options.out.join("pack.mcmeta"), json)
        .map_err(|e| DriverError::io(format!("writing pack.mcmeta: {e}")))
}

fn write_icon(options: &AssembleOptions) -> DriverResult<()> {
    let dest = options.out.join("pack.png");
    match options.icon {
        Some(path) => match fs::copy(path, &dest) {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "icon not found, falling back to the bundled default");
                fs::write(&dest, DEFAULT_ICON).map_err(|e| DriverError::io(format!("writing default icon: {e}")))
            }
        },
        None => fs::write(&dest, DEFAULT_ICON).map_err(|e| DriverError::io(format!("writing default icon: {e}"))),
    }
}

fn write_user_functions(out: &Path, emit: &EmitOutput) -> DriverResult<()> {
    for function in &emit.functions {
        let namespace = function.qualified_path[..function.qualified_path.len() - 1].join(".");
        let name = function.qualified_path.last().expect("qualified path is non-empty");
        let dir = out.join("data").join(&namespace).join("functions");
        fs::create_dir_all(&dir).map_err(|e| DriverError::io(format!("creating '{}': {e}", dir.display())))?;
        let path = dir.join(format!("{name}.mcfunction"));
        fs::write(&path, &function.text).map_err(|e| DriverError::io(format!("writing '{}': {e}", path.display())))?;
    }
    Ok(())
}

fn write_internal_functions(out: &Path, build_uuid: &str, emit: &EmitOutput) -> DriverResult<()> {
    if emit.internal_functions.is_empty() {
        return Ok(());
    }
    let dir = out.join("data").join(build_uuid).join("functions");
    fs::create_dir_all(&dir).map_err(|e| DriverError::io(format!("creating '{}': {e}", dir.display())))?;
    for helper in &emit.internal_functions {
        let path = dir.join(format!("{}.mcfunction", helper.name));
        fs::write(&path, &helper.text).map_err(|e| DriverError::io(format!("writing '{}': {e}", path.display())))?;
    }
    Ok(())
}

/// Copies every `External` function's referenced `.mcfunction` source file
/// into the datapack at its declared engine location (spec §8 scenario 4).
/// `engine_location` is `namespace:path/to/function`. Each `-s` source root
/// is searched for `<root>/<namespace>/<path>.mcfunction`, exactly where
/// `original_source/src/compiler.py`'s `os.path.join(directory, namespace,
/// *path) + ".mcfunction"` looks; a found file is copied every time it
/// matches, later roots overwriting earlier ones, matching the original's
/// un-`break`-ed loop.
fn write_external_functions(out: &Path, source_roots: &[PathBuf], functions: &FunctionTable) -> DriverResult<()> {
    for function in functions.iter() {
        if let Function::External { engine_location, .. } = function {
            let Some((namespace, path)) = engine_location.split_once(':') else {
                continue;
            };
            let segments: Vec<&str> = path.split('/').collect();
            let Some((file_stem, dir_segments)) = segments.split_last() else {
                continue;
            };

            let dest_dir = out.join("data").join(namespace).join("functions").join(dir_segments.iter().collect::<PathBuf>());
            fs::create_dir_all(&dest_dir)
                .map_err(|e| DriverError::io(format!("creating '{}': {e}", dest_dir.display())))?;
            let dest_file = dest_dir.join(format!("{file_stem}.mcfunction"));

            let mut found = false;
            for root in source_roots {
                let mut source = root.join(namespace);
                for segment in &segments {
                    source.push(segment);
                }
                source.set_extension("mcfunction");
                if source.exists() {
                    fs::copy(&source, &dest_file)
                        .map_err(|e| DriverError::io(format!("copying '{}': {e}", source.display())))?;
                    found = true;
                }
            }
            if !found {
                tracing::warn!(location = %engine_location, "mcfunction source file not found in any source directory");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubent_emit::EmittedFunction;
    use tempfile::TempDir;

    #[test]
    fn writes_pack_meta_and_icon_and_function_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let options = AssembleOptions {
            out: &out,
            build_uuid: "deadbeefdeadbeefdeadbeefdeadbeef",
            pack_format: 15,
            description: "test pack",
            icon: None,
        };
        let emit = EmitOutput {
            functions: vec![EmittedFunction {
                qualified_path: vec!["demo".to_string(), "main".to_string()],
                text: "say hi\n".to_string(),
            }],
            internal_functions: vec![],
        };
        let functions = FunctionTable::new();

        assemble(&options, &emit, &functions, &[]).unwrap();

        assert!(out.join("pack.mcmeta").exists());
        assert!(out.join("pack.png").exists());
        assert!(out.join("data/demo/functions/main.mcfunction").exists());
        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("pack.mcmeta")).unwrap()).unwrap();
        assert_eq!(meta["pack"]["pack_format"], 15);
    }

    #[test]
    fn rewrites_existing_output_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("stale.txt"), "old").unwrap();

        let options = AssembleOptions {
            out: &out,
            build_uuid: "deadbeefdeadbeefdeadbeefdeadbeef",
            pack_format: 15,
            description: "test pack",
            icon: None,
        };
        let emit = EmitOutput { functions: vec![], internal_functions: vec![] };
        let functions = FunctionTable::new();
        assemble(&options, &emit, &functions, &[]).unwrap();

        assert!(!out.join("stale.txt").exists());
    }

    #[test]
    fn copies_external_mcfunction_from_its_source_root() {
        let src_root = TempDir::new().unwrap();
        let nested = src_root.path().join("minecraft");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("reload.mcfunction"), "reload\n").unwrap();

        let out_root = TempDir::new().unwrap();
        let out = out_root.path().join("out");
        let options = AssembleOptions {
            out: &out,
            build_uuid: "deadbeefdeadbeefdeadbeefdeadbeef",
            pack_format: 15,
            description: "test pack",
            icon: None,
        };
        let emit = EmitOutput { functions: vec![], internal_functions: vec![] };
        let mut functions = FunctionTable::new();
        functions.declare(Function::External {
            qualified_path: vec!["demo".to_string(), "reload".to_string()],
            parameters: vec![],
            return_type: cubent_par::CubentType::Void,
            engine_location: "minecraft:reload".to_string(),
        });

        assemble(&options, &emit, &functions, &[src_root.path().to_path_buf()]).unwrap();

        let copied = out.join("data/minecraft/functions/reload.mcfunction");
        assert!(copied.exists());
        assert_eq!(fs::read_to_string(copied).unwrap(), "reload\n");
    }

    #[test]
    fn missing_external_source_is_skipped_without_error() {
        let out_root = TempDir::new().unwrap();
        let out = out_root.path().join("out");
        let options = AssembleOptions {
            out: &out,
            build_uuid: "deadbeefdeadbeefdeadbeefdeadbeef",
            pack_format: 15,
            description: "test pack",
            icon: None,
        };
        let emit = EmitOutput { functions: vec![], internal_functions: vec![] };
        let mut functions = FunctionTable::new();
        functions.declare(Function::External {
            qualified_path: vec!["demo".to_string(), "reload".to_string()],
            parameters: vec![],
            return_type: cubent_par::CubentType::Void,
            engine_location: "minecraft:reload".to_string(),
        });

        assemble(&options, &emit, &functions, &[]).unwrap();

        assert!(!out.join("data/minecraft/functions/reload.mcfunction").exists());
    }
}
