mod bridge;
mod cli;
mod model;
mod orchestrator;
mod scheduler;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_scripted = args.once || args.json;

    match cli::run(args).await {
        Ok(()) => {
            // Explicit exit 0 for scripted modes so wrappers see a clean status.
            if is_scripted {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}
