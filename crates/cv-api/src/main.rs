use cv_core::Config;

// Use mimalloc as the global allocator for lower fragmentation on musl-based containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = cv_api::setup::initialize_app(config.clone()).await?;

    cv_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
