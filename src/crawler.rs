use crate::error::CrawlerError;
use crate::extract::extract_text;
use crate::indexer::TokenIndexer;
use crate::message::Message;
use crate::parser::TokenParser;
use crate::source::MessageSource;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info};

/// Pause between two fetch cycles in continuous mode.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// How far back the first fetch after startup looks.
pub(crate) const STARTUP_LOOKBACK_DAYS: i64 = 15;

/// Boundary below which messages count as processed. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Watermark {
    pub since: DateTime<Utc>,
    pub last_uid: u32,
}

impl Watermark {
    pub(crate) fn new(since: DateTime<Utc>) -> Self {
        Self { since, last_uid: 0 }
    }

    pub(crate) fn at_startup() -> Self {
        Self::new(Utc::now() - ChronoDuration::days(STARTUP_LOOKBACK_DAYS))
    }

    pub(crate) fn covers(&self, uid: u32) -> bool {
        uid <= self.last_uid
    }

    pub(crate) fn advance(&mut self, message: &Message) {
        self.since = self.since.max(message.date.with_timezone(&Utc));
        self.last_uid = self.last_uid.max(message.uid);
    }
}

/// Runs extraction, parsing and indexing for messages, one at a time.
pub(crate) struct Crawler<P, I> {
    parser: P,
    indexer: I,
}

impl<P, I> Crawler<P, I>
where
    P: TokenParser,
    I: TokenIndexer,
{
    pub(crate) fn new(parser: P, indexer: I) -> Self {
        Self { parser, indexer }
    }

    /// Parse and index a single message. Returns the number of tokens indexed.
    pub(crate) async fn process_message(&self, message: &Message) -> Result<usize, CrawlerError> {
        let Some(text) = extract_text(message) else {
            info!("No email text in uid {}, nothing to parse", message.uid);
            return Ok(0);
        };

        let tokens = self.parser.parse(&message.subject, &text).await?;
        let count = tokens.len();
        for mut token in tokens {
            token.insert("subject".to_string(), Value::String(message.subject.clone()));
            debug!("Parsed result: {:?}", token);
            let ack = self.indexer.index(&token).await?;
            debug!("Indexed result: {}", ack);
        }
        Ok(count)
    }

    /// Process every message past `watermark`, advancing it after each
    /// completed message. On error the watermark stays at the last completed
    /// message and the rest of the batch is left for the next cycle.
    pub(crate) async fn process_messages<S>(
        &self,
        source: &mut S,
        watermark: &mut Watermark,
    ) -> Result<(), CrawlerError>
    where
        S: MessageSource + ?Sized + Send,
    {
        for uid in source.search(&watermark.since).await? {
            if watermark.covers(uid) {
                debug!("Already seen message with uid {}. Skipping", uid);
                continue;
            }
            // No Date comparison here: SINCE in `search` is the only date filter.
            let Some(message) = source.fetch(uid).await? else {
                continue;
            };

            info!(
                "Processing message uid {} message_id {} with subject {:?}",
                uid,
                message.message_id.as_deref().unwrap_or("-"),
                message.subject
            );
            let indexed = self.process_message(&message).await?;
            watermark.advance(&message);
            debug!(
                "Processed message uid {} ({} tokens). Watermark is now {:?}",
                uid, indexed, watermark
            );
        }
        Ok(())
    }

    /// Fetch-process-wait cycle. Only returns on error.
    pub(crate) async fn poll<S>(
        &self,
        source: &mut S,
        watermark: &mut Watermark,
    ) -> Result<Infallible, CrawlerError>
    where
        S: MessageSource + ?Sized + Send,
    {
        loop {
            self.process_messages(source, watermark).await?;
            info!(
                "Processed all. New since date {}, sleeping {}s",
                watermark.since,
                POLL_INTERVAL.as_secs()
            );
            async_std::task::sleep(POLL_INTERVAL).await;
        }
    }
}
