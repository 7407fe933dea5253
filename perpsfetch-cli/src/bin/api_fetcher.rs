//! api-fetcher: fetch all Perps API datasets into JSON files.

use clap::Parser;
use perpsfetch_cli::{init_tracing, FetchArgs};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "api-fetcher",
    about = "Fetch latest, historical, alias and registry data from the Perps API"
)]
struct Cli {
    #[command(flatten)]
    fetch: FetchArgs,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    cli.fetch.run().into()
}
