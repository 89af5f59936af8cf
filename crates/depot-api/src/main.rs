use depot_core::GatewayConfig;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize logging
    depot_api::telemetry::init_telemetry();

    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize the application (storage backend, job registry, routes)
    let (_state, router) = depot_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    depot_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
