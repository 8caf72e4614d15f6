//! File-level pipeline: read the tree document, load it, lower it to JS and
//! optionally prepend the runtime library.

use crate::backends::js::{JsLoweringConfig, JsModule, lower_module_to_js};
use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorMetaDataKey};
use crate::compiler_frontend::{CompilerFrontend, Flag};
use crate::projects::settings::Config;
use crate::timer_log;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct BuildOutput {
    /// Generated code, with the runtime library ahead of it when requested.
    pub js: String,

    /// Diagnostic rendering of the loaded tree, only with `Flag::ShowIr`.
    pub tree: Option<String>,

    pub class_orders: Vec<(String, Vec<String>)>,
}

/// Compiles one tree document from disk.
pub fn build_file(
    path: &Path,
    flags: &[Flag],
    config: &Config,
) -> Result<BuildOutput, CompilerError> {
    let time = Instant::now();

    let source = fs::read_to_string(path).map_err(|e| {
        CompilerError::file_error(path, format!("Could not read input file: {e}"))
    })?;

    // --------------------------------------------
    //   LOAD AND VALIDATE THE TREE
    // --------------------------------------------
    let tree = CompilerFrontend::new(path).source_to_tree(&source)?;
    timer_log!(time, "Tree loaded in: ");

    let tree_text = if flags.contains(&Flag::ShowIr) {
        Some(tree.to_string())
    } else {
        None
    };

    // --------------------------------------------
    //   LOWER TO JAVASCRIPT
    // --------------------------------------------
    let time = Instant::now();
    let module = lower_module_to_js(&tree, &config.lowering_config())
        .map_err(|e| lowering_failed(e, path))?;
    timer_log!(time, "Lowered to JS in: ");

    let js = if flags.contains(&Flag::IncludeBuiltins) {
        let runtime = fs::read_to_string(&config.runtime_path).map_err(|e| {
            CompilerError::file_error(
                &config.runtime_path,
                format!("Could not read the runtime library: {e}"),
            )
        })?;
        format!("{}\n{}", runtime.trim_end(), module.source)
    } else {
        module.source
    };

    Ok(BuildOutput {
        js,
        tree: tree_text,
        class_orders: module.class_orders,
    })
}

/// Compiles an in-memory tree document. `path` only labels errors.
pub fn compile_source(
    path: &Path,
    source: &str,
    config: &JsLoweringConfig,
) -> Result<JsModule, CompilerError> {
    let tree = CompilerFrontend::new(path).source_to_tree(source)?;
    lower_module_to_js(&tree, config).map_err(|e| lowering_failed(e, path))
}

/// Compiles independent modules in parallel, each with its own lowering context.
/// Results keep the order of `sources`.
pub fn compile_sources(
    sources: &[(PathBuf, String)],
    config: &JsLoweringConfig,
) -> Vec<Result<JsModule, CompilerError>> {
    let time = Instant::now();

    let modules = sources
        .par_iter()
        .map(|(path, source)| compile_source(path, source, config))
        .collect();

    timer_log!(time, "Batch compiled in: ");
    modules
}

fn lowering_failed(error: CompilerError, path: &Path) -> CompilerError {
    error
        .with_file_path(path.to_path_buf())
        .with_metadata(ErrorMetaDataKey::CompilationStage, "JS Lowering")
}

#[cfg(test)]
#[path = "tests/build_tests.rs"]
mod tests;
