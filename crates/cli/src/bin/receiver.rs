//! Receiver role: picks files up from landing directories and places
//! them into consumer directories, renaming where configured.

use tracing::error;

#[tokio::main]
async fn main() {
    filegate_cli::init_tracing();
    if let Err(e) = filegate_cli::run_role("receiver", "FILEGATE_RECEIVER_CONFIG").await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}
