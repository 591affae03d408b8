//! Compile orchestration (spec §6, §8): resolve the version, discover
//! sources, parse, type-check and emit, then assemble the datapack.
//!
//! Grounded on `faxc-drv/src/lib.rs`'s `Session::compile` phase shape
//! (`read_sources` → `run_pipeline` → `emit_output`), collapsed to the
//! phases Cubent actually has — there's no MIR/LIR/codegen stage here, the
//! Emitter does type-check-and-lower in one pass.

use std::fs;

use cubent_emit::Emitter;
use cubent_par::{FunctionTable, Parser};
use cubent_util::span::SourceMap;
use cubent_util::Handler;
use rand::Rng;

use crate::assemble::{assemble, AssembleOptions};
use crate::config::{Config, EngineVersion, VersionSpec};
use crate::discover::discover;
use crate::error::{DriverError, DriverResult};
use crate::version_info::VersionInfoProvider;

pub struct Session<'a> {
    config: Config,
    version_info: &'a dyn VersionInfoProvider,
}

impl<'a> Session<'a> {
    pub fn new(config: Config, version_info: &'a dyn VersionInfoProvider) -> Self {
        Session { config, version_info }
    }

    /// Runs the whole pipeline. Returns `Ok(())` on a clean compile, or a
    /// [`DriverError`] — the version gate and any I/O failure short-circuit
    /// immediately; parse/type errors are collected and reported together
    /// via the returned `CompileFailed` count, with the full diagnostic
    /// text available through `handler`/`sources` for the caller to render.
    pub fn compile(&self, handler: &Handler, sources: &mut SourceMap) -> DriverResult<()> {
        let engine_version = self.resolve_version()?;
        if engine_version.precedes(&EngineVersion::MINIMAL) {
            return Err(DriverError::config(format!(
                "engine version {engine_version} is below the minimum supported version {}",
                EngineVersion::MINIMAL
            )));
        }

        let paths = discover(&self.config.sources)?;

        let mut functions = FunctionTable::new();
        for path in &paths {
            let text = fs::read_to_string(path)
                .map_err(|e| DriverError::io(format!("reading '{}': {e}", path.display())))?;
            let file = sources.add_file(path.clone(), text);
            let source_text = sources.text(file).expect("just added").to_string();
            let mut parser = Parser::new(&source_text, file, handler);
            parser
                .parse_file(&mut functions)
                .map_err(|_| DriverError::CompileFailed(handler.error_count()))?;
        }

        if handler.has_errors() {
            return Err(DriverError::CompileFailed(handler.error_count()));
        }

        let build_uuid = generate_build_uuid();
        let emitter = Emitter::new(build_uuid.clone(), &functions, handler);
        let Ok(emit) = emitter.emit_all() else {
            return Err(DriverError::CompileFailed(handler.error_count()));
        };
        if handler.has_errors() {
            return Err(DriverError::CompileFailed(handler.error_count()));
        }

        let pack_format = self
            .version_info
            .pack_format(&engine_version)
            .ok_or_else(|| DriverError::config(format!("unrecognized engine version {engine_version}")))?;

        let options = AssembleOptions {
            out: &self.config.out,
            build_uuid: &build_uuid,
            pack_format,
            description: &self.config.description,
            icon: self.config.icon.as_deref(),
        };
        assemble(&options, &emit, &functions, &self.config.sources)
    }

    fn resolve_version(&self) -> DriverResult<EngineVersion> {
        match &self.config.version {
            VersionSpec::Explicit(v) => Ok(*v),
            VersionSpec::Latest => Ok(self.version_info.latest()),
        }
    }
}

fn generate_build_uuid() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
