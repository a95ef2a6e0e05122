mod config;
mod crawler;
mod error;
mod extract;
#[cfg(test)]
mod fakes;
mod imap_util;
mod indexer;
mod message;
mod parser;
mod record;
mod source;
mod supervisor;

use config::CrawlerConfig;

use tracing::debug;

#[async_std::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = CrawlerConfig::from_env()?;
    debug!(indexer = %config.indexer_url, parsers = ?config.parser_urls, continuous = config.imap.is_some());
    supervisor::run(config).await?;
    Ok(())
}
