//! `petstore` binary entry point.
//!
//! Parses arguments and hands off to [`petstore_server::run`]; failures are
//! printed to stderr with a non-zero exit code.

use clap::Parser;
use petstore_server::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = petstore_server::run(cli).await {
        eprintln!("petstore: {err}");
        std::process::exit(1);
    }
}
