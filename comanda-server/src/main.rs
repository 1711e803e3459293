use comanda_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env + logging
    setup_environment();

    print_banner();

    tracing::info!("Comanda server starting...");

    // 2. Configuration (missing printer is fatal)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    // 3. Store + printer
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server (background tasks start inside run)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
