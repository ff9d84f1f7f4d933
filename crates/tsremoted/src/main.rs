use std::process::ExitCode;

use tsremoted::{SystemConfigLoader, run_daemon};

fn main() -> ExitCode {
    match run_daemon(&SystemConfigLoader) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("tsremoted: {error}");
            ExitCode::FAILURE
        }
    }
}
