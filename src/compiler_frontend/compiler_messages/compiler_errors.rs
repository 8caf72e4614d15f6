//! Compiler errors
//!
//! Every stage of the pipeline reports failure through a single `CompilerError` value.
//! Translation is fail-fast: the first error aborts the whole translation unit,
//! so there is no partial output and nothing to recover beyond fixing the input.

use crate::compiler_frontend::ir::ir_nodes::SourcePosition;
use crate::compiler_frontend::ir::ir_schema::NodeKind;
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorType {
    /// The input document could not be read as a tree at all.
    Syntax,

    /// A node was built with an unknown field, a duplicate field or without a required field.
    Schema,

    /// No lowering rule exists for the construct, or it is explicitly rejected.
    Unsupported,

    /// The class hierarchy has no consistent resolution order.
    /// Carries the cycle of blocking classes, rotated to start at the repeated one.
    Linearization { cycle: Vec<String> },

    /// A class lists a base that has not been defined yet.
    UndefinedBase,

    /// An instance method does not declare its receiver parameter.
    MissingReceiver,

    File,
    Config,

    /// An internal invariant of the compiler was broken.
    Compiler,
}

impl ErrorType {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorType::Syntax => "SyntaxError",
            ErrorType::Schema => "SchemaError",
            ErrorType::Unsupported => "UnsupportedConstructError",
            ErrorType::Linearization { .. } => "LinearizationError",
            ErrorType::UndefinedBase => "UndefinedBaseError",
            ErrorType::MissingReceiver => "MissingReceiverError",
            ErrorType::File => "FileError",
            ErrorType::Config => "ConfigError",
            ErrorType::Compiler => "CompilerError",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorMetaDataKey {
    CompilationStage,
    NodeKind,
    ClassName,
    PrimarySuggestion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLocation {
    pub scope: PathBuf,
    pub position: Option<SourcePosition>,
}

impl ErrorLocation {
    pub fn new(scope: PathBuf, position: Option<SourcePosition>) -> Self {
        ErrorLocation { scope, position }
    }
}

#[derive(Debug, Clone)]
pub struct CompilerError {
    pub msg: String,
    pub location: ErrorLocation,
    pub error_type: ErrorType,
    pub metadata: FxHashMap<ErrorMetaDataKey, String>,
}

impl CompilerError {
    pub fn new(msg: impl Into<String>, location: ErrorLocation, error_type: ErrorType) -> Self {
        CompilerError {
            msg: msg.into(),
            location,
            error_type,
            metadata: FxHashMap::default(),
        }
    }

    pub fn syntax_error(msg: impl Into<String>, position: Option<SourcePosition>) -> Self {
        Self::new(
            msg,
            ErrorLocation::new(PathBuf::new(), position),
            ErrorType::Syntax,
        )
    }

    pub fn schema_error(msg: impl Into<String>) -> Self {
        Self::new(msg, ErrorLocation::default(), ErrorType::Schema)
    }

    /// Names the node kind so the message always says which construct was refused.
    pub fn unsupported(kind: NodeKind, detail: impl Display) -> Self {
        Self::new(
            format!("{}: {}", kind.name(), detail),
            ErrorLocation::default(),
            ErrorType::Unsupported,
        )
        .with_metadata(ErrorMetaDataKey::NodeKind, kind.name())
    }

    pub fn linearization(class_name: &str, cycle: Vec<String>) -> Self {
        let mut rendered = cycle.clone();
        if let Some(first) = cycle.first() {
            rendered.push(first.to_owned());
        }

        Self::new(
            format!(
                "Cannot create a consistent method resolution order for '{}'. Cycle among base classes: {}",
                class_name,
                rendered.join(" < ")
            ),
            ErrorLocation::default(),
            ErrorType::Linearization { cycle },
        )
        .with_metadata(ErrorMetaDataKey::ClassName, class_name)
    }

    pub fn undefined_base(class_name: &str, base: &str) -> Self {
        Self::new(
            format!(
                "Class '{}' inherits from '{}', which has not been defined yet",
                class_name, base
            ),
            ErrorLocation::default(),
            ErrorType::UndefinedBase,
        )
        .with_metadata(ErrorMetaDataKey::ClassName, class_name)
        .with_metadata(
            ErrorMetaDataKey::PrimarySuggestion,
            "Define base classes before the classes that derive from them",
        )
    }

    pub fn missing_receiver(class_name: &str, method: &str) -> Self {
        Self::new(
            format!(
                "Method '{}.{}' must take the instance as its first parameter",
                class_name, method
            ),
            ErrorLocation::default(),
            ErrorType::MissingReceiver,
        )
        .with_metadata(ErrorMetaDataKey::ClassName, class_name)
        .with_metadata(
            ErrorMetaDataKey::PrimarySuggestion,
            "Add a receiver parameter (usually 'self') or mark the method with @staticmethod",
        )
    }

    pub fn file_error(path: &Path, msg: impl Into<String>) -> Self {
        Self::new(
            msg,
            ErrorLocation::new(path.to_path_buf(), None),
            ErrorType::File,
        )
    }

    pub fn config_error(path: &Path, msg: impl Into<String>) -> Self {
        Self::new(
            msg,
            ErrorLocation::new(path.to_path_buf(), None),
            ErrorType::Config,
        )
    }

    pub fn compiler_error(msg: impl Into<String>) -> Self {
        Self::new(msg, ErrorLocation::default(), ErrorType::Compiler)
    }

    pub fn with_file_path(mut self, path: PathBuf) -> Self {
        self.location.scope = path;
        self
    }

    /// Only fills in a position if a more specific one was not recorded already.
    pub fn with_position(mut self, position: Option<SourcePosition>) -> Self {
        if self.location.position.is_none() {
            self.location.position = position;
        }
        self
    }

    pub fn with_metadata(mut self, key: ErrorMetaDataKey, value: impl Into<String>) -> Self {
        self.metadata.insert(key, value.into());
        self
    }

    pub fn cycle(&self) -> Option<&[String]> {
        match &self.error_type {
            ErrorType::Linearization { cycle } => Some(cycle),
            _ => None,
        }
    }
}

impl Display for CompilerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.error_type.label(), self.msg)?;

        if let Some(position) = self.location.position {
            write!(f, " (line {}, column {})", position.line, position.column)?;
        }

        Ok(())
    }
}

impl std::error::Error for CompilerError {}

#[macro_export]
macro_rules! return_schema_error {
    ($msg:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::schema_error($msg))
    };
}

#[macro_export]
macro_rules! return_unsupported_error {
    ($kind:expr, $msg:expr) => {
        return Err(
            $crate::compiler_frontend::compiler_errors::CompilerError::unsupported($kind, $msg),
        )
    };
    ($kind:expr, $msg:expr, $position:expr) => {
        return Err(
            $crate::compiler_frontend::compiler_errors::CompilerError::unsupported($kind, $msg)
                .with_position($position),
        )
    };
}

#[macro_export]
macro_rules! return_compiler_error {
    ($msg:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::compiler_error($msg))
    };
}

#[macro_export]
macro_rules! return_file_error {
    ($path:expr, $msg:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::file_error(
            $path, $msg,
        ))
    };
}

#[macro_export]
macro_rules! return_config_error {
    ($path:expr, $msg:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::config_error(
            $path, $msg,
        ))
    };
}
