//! Draftmill CLI — scheduled blog-draft pipeline.
//!
//! Selects the next topic from a curated catalog and assembles a dated
//! draft artifact, keeping a durable selection history between runs.

mod commands;

use std::process::ExitCode;

use clap::Parser;

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    commands::init_tracing(&cli);

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("Error: {report:#}");
            ExitCode::from(commands::exit_code(&report))
        }
    }
}
