use inviteday::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting InviteDay");

    // Load configuration
    let config = startup::load_config()?;

    // Wire optional collaborators
    let ctx = startup::build_context(config).await;

    // Serve until shutdown
    startup::serve(ctx).await
}
