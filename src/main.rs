use std::process::ExitCode;

fn main() -> ExitCode {
    pyjs::projects::cli::start_cli()
}
