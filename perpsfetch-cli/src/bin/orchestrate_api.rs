//! orchestrate-api: fetch data from the Perps API in place of running the
//! exchange collectors.

use clap::Parser;
use perpsfetch_cli::{init_tracing, FetchArgs};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "orchestrate-api",
    about = "Fetch data from the Perps API in place of running collectors"
)]
struct Cli {
    #[command(flatten)]
    fetch: FetchArgs,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    info!(
        "fetching data from API to {}",
        cli.fetch.output_dir.display()
    );

    let status = cli.fetch.run();
    if status.is_success() {
        info!("successfully fetched all data from API");
    } else {
        error!("failed to fetch data from API");
    }

    status.into()
}
