mod endpoints;
mod filters;
mod pool_processor;
mod types;
mod utils;

use crate::types::{Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    println!("[main] Starting up...");

    let config = Config {
        hostname: std::env::var("PLEDGE_FEED_HOSTNAME").unwrap_or_else(|_| "127.0.0.1".into()),
        chain_id: None,
        profile_override: None,
        csv_file: "./pledge_pool_snapshot.csv".into(),
    };

    let pool_base_url = endpoints::resolve_key("info.poolBaseInfo", &config.hostname)?;
    println!("[main] Pool base info served from {}", pool_base_url);

    let processor = pool_processor::PoolProcessor::new(&config);
    processor.run().await?;

    println!("[main] Snapshot complete. Exiting.");
    Ok(())
}
