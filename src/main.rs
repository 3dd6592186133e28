use anyhow::Result;
use lepkom_attendance::utils::logging;
use lepkom_attendance::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialise logging
    logging::init(config.verbose_logging);

    // Log in and crawl
    App::initialize(config).await?.run().await?;

    Ok(())
}
