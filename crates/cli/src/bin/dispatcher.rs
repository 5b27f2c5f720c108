//! Dispatcher role: moves produced files out of application
//! directories, toward shared drives and external servers.

use tracing::error;

#[tokio::main]
async fn main() {
    filegate_cli::init_tracing();
    if let Err(e) = filegate_cli::run_role("dispatcher", "FILEGATE_DISPATCHER_CONFIG").await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}
