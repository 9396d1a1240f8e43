//! Entry point for the `xenond` playground daemon.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match xenond::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            drop(writeln!(io::stderr(), "xenond: {error}"));
            ExitCode::FAILURE
        }
    }
}
