//! Binary entrypoint for the `gridwatch` bot.

use std::process::ExitCode;

fn main() -> ExitCode {
    // `.env` values feed the GRIDWATCH_* flags; a missing file is fine.
    let _ = dotenvy::dotenv();
    match gridwatch::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
