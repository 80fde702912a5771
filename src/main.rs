mod backend;
mod cli;
mod control;
mod debounce;
mod geo;
mod query;
mod session;

use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (name, result) = match cli.command {
        Command::Session {
            backend,
            suggest,
            json,
        } => (
            "session",
            session::run(backend, suggest.into_config(), json).await,
        ),
        Command::Suggest {
            input,
            backend,
            suggest,
            json,
        } => (
            "suggest",
            session::suggest(backend, suggest.into_config(), input, json).await,
        ),
        Command::Resolve { words, backend } => {
            ("resolve", session::resolve(backend, words).await)
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, command = name, "command failed");
        eprintln!("w3wsuggest {name}: {e}");
        std::process::exit(1);
    }
}
