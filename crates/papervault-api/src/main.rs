use papervault_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = papervault_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    papervault_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
