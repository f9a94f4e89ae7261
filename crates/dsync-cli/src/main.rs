use dsync_core::logging;
use dsync_core::TransferError;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; fall back to stderr if the state dir is unusable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    // Parse CLI and dispatch. Transfer failures exit with their stage's status.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("dsync error: {:#}", err);
        let code = err
            .downcast_ref::<TransferError>()
            .map_or(1, TransferError::exit_code);
        std::process::exit(code);
    }
}
