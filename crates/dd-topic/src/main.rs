//! dd-topic — build and match AWS IoT Device Defender topics from the shell.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use dd_topic::{Command, Output, USAGE};

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so stdout carries only command output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dd-topic starting");

    let command = match Command::parse(std::env::args_os().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    match command.run()? {
        Output::Text(text) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Output::NoMatch => {
            println!("no match");
            Ok(ExitCode::FAILURE)
        }
    }
}
