mod cli;
mod commands;

use artifact_gate::domain::outcome::{classify, exit};
use artifact_gate::services::output::print_error;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    // Exit 2 is reserved for policy violations, so usage errors exit 1.
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let status = if e.use_stderr() { exit::INTERNAL } else { exit::OK };
        let _ = e.print();
        std::process::exit(status);
    });

    let code = match commands::dispatch(&cli) {
        Ok(code) => code,
        Err(err) => {
            let (code, status) = classify(&err);
            print_error(cli.json, code, &format!("{err:#}"));
            status
        }
    };
    std::process::exit(code);
}
