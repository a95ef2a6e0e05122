use crate::config::CrawlerConfig;
use crate::crawler::{Crawler, Watermark};
use crate::error::{CrawlerError, Disposition};
use crate::indexer::{HttpIndexer, TokenIndexer};
use crate::parser::{HttpParser, TokenParser};
use crate::record::decode_message;
use crate::source::{ImapSource, MessageSource};
use async_std::io::{Read, ReadExt};
use chrono::Utc;
use std::future::Future;
use tracing::{info, warn};

/// Pick the run mode from the configuration and run it. Continuous mode only
/// returns on an error that is not worth a reconnect.
pub(crate) async fn run(config: CrawlerConfig) -> Result<(), CrawlerError> {
    let client = reqwest::Client::new();
    info!("Using {} parser endpoint(s)", config.parser_urls.len());
    let crawler = Crawler::new(
        HttpParser::new(client.clone(), config.parser_urls),
        HttpIndexer::new(client, &config.indexer_url),
    );

    match config.imap {
        Some(imap) => {
            info!("Starting crawler");
            let mut watermark = Watermark::at_startup();
            run_against_imap(|| ImapSource::connect(&imap), &crawler, &mut watermark).await
        }
        None => {
            info!("Running crawler on stdin");
            let indexed = run_once(&crawler, async_std::io::stdin()).await?;
            info!("Done, indexed {} token(s)", indexed);
            Ok(())
        }
    }
}

/// Open sessions with `connect` until one fails with an error that a
/// reconnect cannot fix. `watermark` outlives every session, so a reconnect
/// resumes where the last one stopped.
async fn run_against_imap<P, I, S, C, F>(
    mut connect: C,
    crawler: &Crawler<P, I>,
    watermark: &mut Watermark,
) -> Result<(), CrawlerError>
where
    P: TokenParser,
    I: TokenIndexer,
    S: MessageSource + Send,
    C: FnMut() -> F,
    F: Future<Output = Result<S, CrawlerError>>,
{
    loop {
        let err = run_session(&mut connect, crawler, watermark).await;
        match err.disposition() {
            Disposition::Reconnect => {
                warn!("IMAP abort ({}). Reconnecting from {:?}", err, watermark);
            }
            Disposition::Abort => return Err(err),
        }
    }
}

async fn run_session<P, I, S, C, F>(
    connect: &mut C,
    crawler: &Crawler<P, I>,
    watermark: &mut Watermark,
) -> CrawlerError
where
    P: TokenParser,
    I: TokenIndexer,
    S: MessageSource + Send,
    C: FnMut() -> F,
    F: Future<Output = Result<S, CrawlerError>>,
{
    let mut source = match connect().await {
        Ok(source) => source,
        Err(err) => return err,
    };
    let err = match crawler.poll(&mut source, watermark).await {
        Ok(never) => match never {},
        Err(err) => err,
    };
    source.logout().await;
    err
}

/// Decode one raw message from `input` and process it.
async fn run_once<P, I, R>(crawler: &Crawler<P, I>, mut input: R) -> Result<usize, CrawlerError>
where
    P: TokenParser,
    I: TokenIndexer,
    R: Read + Unpin,
{
    let mut raw = Vec::new();
    input
        .read_to_end(&mut raw)
        .await
        .map_err(CrawlerError::Stdin)?;
    let message = decode_message(0, &raw, Utc::now().fixed_offset())?;
    crawler.process_message(&message).await
}
