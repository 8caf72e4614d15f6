//! Project settings read from an optional `pyjs.toml` next to the input file.

use crate::backends::js::JsLoweringConfig;
use crate::compiler_frontend::compiler_errors::CompilerError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "pyjs.toml";
pub const DEFAULT_RUNTIME_FILE: &str = "py-builtins.js";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Runtime library prepended by `--include-builtins`.
    pub runtime_path: PathBuf,

    pub emit_locations: bool,
    pub pretty: bool,

    /// Output file for the generated code. Standard output when unset.
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            runtime_path: PathBuf::from(DEFAULT_RUNTIME_FILE),
            emit_locations: false,
            pretty: true,
            output: None,
        }
    }
}

impl Config {
    /// Loads the settings for inputs living in `dir`.
    /// A missing config file means defaults; relative paths are resolved against `dir`.
    pub fn load(dir: &Path) -> Result<Config, CompilerError> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.is_file() {
            return Ok(Config::default().resolved_against(dir));
        }

        let text = fs::read_to_string(&config_path).map_err(|e| {
            CompilerError::config_error(&config_path, format!("Could not read config file: {e}"))
        })?;

        Ok(Config::from_toml_str(&text, &config_path)?.resolved_against(dir))
    }

    /// Parses config text. `config_path` is only used to report errors.
    pub fn from_toml_str(text: &str, config_path: &Path) -> Result<Config, CompilerError> {
        toml::from_str(text).map_err(|e| {
            CompilerError::config_error(config_path, format!("Invalid config file: {e}"))
        })
    }

    pub fn lowering_config(&self) -> JsLoweringConfig {
        JsLoweringConfig {
            pretty: self.pretty,
            emit_locations: self.emit_locations,
        }
    }

    fn resolved_against(mut self, dir: &Path) -> Self {
        if self.runtime_path.is_relative() {
            self.runtime_path = dir.join(&self.runtime_path);
        }

        if let Some(output) = &self.output {
            if output.is_relative() {
                self.output = Some(dir.join(output));
            }
        }

        self
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
