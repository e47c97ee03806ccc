use std::process::ExitCode;

fn main() -> ExitCode {
    apidocgen::cli::run()
}
