//! `binaan`: admin reports for the binaan child-sponsorship backend
//!
//! # Usage
//!
//! ```sh
//! # Attendance of every child in 2024, with one child's activity log
//! binaan --token $TOKEN anak --year 2024 --detail 42
//!
//! # Validate a family survey
//! binaan survey validate 12 tidak-layak --catatan "Penghasilan di atas batas"
//!
//! # Keep the tutor report open; type `year 2023`, `search budi`, `quit`
//! binaan watch tutor
//! ```

use std::process::ExitCode;

use binaan_client::cli::{self, Cli};
use binaan_client::logging;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
