//! Command-line entrypoint for the pyjs compiler.
//!
//! Parses the command and flags, loads the settings next to the input file and
//! runs the build pipeline over it.

use crate::build_system::build::{self, BuildOutput};
use crate::compiler_frontend::Flag;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::display_messages::print_formatted_error;
use crate::projects::settings::Config;
use saying::say;
use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Compile(String), // Compiles one tree document to JS
    Help,
}

const KNOWN_FLAGS: &[&str] = &["--include-builtins", "--show-ir"];

pub fn start_cli() -> ExitCode {
    let compiler_args: Vec<String> = env::args().collect();
    let args = compiler_args.get(1..).unwrap_or_default();

    let command = match get_command(args) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help();
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }

        Command::Compile(path) => {
            let flags = get_flags(args);

            match compile(Path::new(&path), &flags) {
                Ok(Some(js)) => {
                    println!("{js}");
                    ExitCode::SUCCESS
                }
                Ok(None) => ExitCode::SUCCESS,
                Err(e) => {
                    print_formatted_error(e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn get_command(args: &[String]) -> Result<Command, String> {
    if args.first().map(String::as_str) == Some("help") {
        return Ok(Command::Help);
    }

    let mut input = None;

    for arg in args {
        if arg.starts_with("--") {
            if !KNOWN_FLAGS.contains(&arg.as_str()) {
                return Err(format!("Unknown flag: '{arg}'"));
            }
            continue;
        }

        if input.is_some() {
            return Err(String::from("Only one input file can be compiled at a time"));
        }
        input = Some(arg.to_owned());
    }

    match input {
        Some(path) => Ok(Command::Compile(path)),
        None => Err(String::from("No input file given")),
    }
}

fn get_flags(args: &[String]) -> Vec<Flag> {
    let mut flags = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--include-builtins" => flags.push(Flag::IncludeBuiltins),
            "--show-ir" => flags.push(Flag::ShowIr),
            _ => {}
        }
    }

    flags
}

/// Builds `path` with the settings found next to it.
/// Returns the code for standard output, or `None` when it was written to the configured output file.
fn compile(path: &Path, flags: &[Flag]) -> Result<Option<String>, CompilerError> {
    let config_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let config = Config::load(config_dir)?;

    let BuildOutput {
        js,
        tree,
        class_orders: _,
    } = build::build_file(path, flags, &config)?;

    if let Some(tree) = tree {
        say!(Bright Black "------------------------------------");
        println!("{tree}");
        say!(Bright Black "------------------------------------");
    }

    match &config.output {
        Some(output) => {
            fs::write(output, js).map_err(|e| {
                CompilerError::file_error(output, format!("Could not write output file: {e}"))
            })?;
            Ok(None)
        }
        None => Ok(Some(js)),
    }
}

fn print_help() {
    say!(Bright Black "------------------------------------");
    say!(Green Bold "pyjs - compiles Python syntax trees to JavaScript");
    say!("Usage: ", Bold "pyjs <file.json>", Italic " [flags]");
    say!(Green Bold "\nCommands:");
    say!("  <file.json>          - Compiles a tree document");
    say!("  help                 - Shows this message");

    say!(Green Bold "\nFlags:");
    say!("  --include-builtins   - Prepends the runtime library");
    say!("  --show-ir            - Prints the loaded tree before the code");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
