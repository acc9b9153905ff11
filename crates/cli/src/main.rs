use std::process::ExitCode;

fn main() -> ExitCode {
    gfv_cli::run()
}
