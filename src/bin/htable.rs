use std::{io, process::ExitCode};

use htstore::{CliError, command::USAGE};
use log::error;

fn main() -> ExitCode {
    env_logger::builder().init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let stdout = io::stdout();

    match htstore::run(&args, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(msg)) => {
            eprintln!("htable: {msg}");
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(target: "main", "{e}");
            eprintln!("htable: {e}");
            ExitCode::FAILURE
        }
    }
}
