use clap::Parser;
use idgrab_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible.
    if cli.log_file {
        if let Err(err) = logging::init_logging() {
            logging::init_logging_stderr();
            tracing::warn!("file logging unavailable, using stderr: {:#}", err);
        }
    } else {
        logging::init_logging_stderr();
    }

    match cli.run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("idgrab error: {:#}", err);
            std::process::exit(1);
        }
    }
}
