pub mod ir;

pub mod compiler_messages {
    pub mod compiler_dev_logging;
    pub mod compiler_errors;
    pub mod display_messages;
}
pub use compiler_messages::compiler_errors;
pub use compiler_messages::display_messages;

pub mod class_linearizer;
pub mod scope_tracker;


use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorMetaDataKey};
use crate::compiler_frontend::ir::ir_json::parse_tree;
use crate::compiler_frontend::ir::ir_nodes::Node;
use crate::ir_log;
use std::path::Path;

/// Flags change the behavior of the core pipeline.
/// For the built-in CLI these are added as cli flags, but builders can decide how to choose flags
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Flag {
    /// Prepend the runtime library source ahead of the generated code
    IncludeBuiltins,

    /// Print the diagnostic tree before the generated code
    ShowIr,
}

pub struct CompilerFrontend<'a> {
    pub(crate) module_path: &'a Path,
}

impl<'a> CompilerFrontend<'a> {
    pub fn new(module_path: &'a Path) -> Self {
        Self { module_path }
    }

    /// -----------------------------
    /// TREE LOADING
    /// -----------------------------
    /// Reads the front-end's JSON document into validated nodes.
    /// Every node is checked against its kind's schema here,
    /// so the lowering stage never sees an unknown or missing field.
    pub fn source_to_tree(&self, source: &str) -> Result<Node, CompilerError> {
        match parse_tree(source) {
            Ok(tree) => {
                ir_log!(Bright Black "Loaded tree:\n", tree);
                Ok(tree)
            }
            Err(e) => Err(e
                .with_file_path(self.module_path.to_path_buf())
                .with_metadata(ErrorMetaDataKey::CompilationStage, "Tree Loading")),
        }
    }
}
