use crate::error::CrawlerError;
use crate::parser::Token;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub(crate) trait TokenIndexer {
    /// Returns the indexer's acknowledgement, whatever JSON it sent back.
    async fn index(&self, token: &Token) -> Result<Value, CrawlerError>;
}

pub(crate) struct HttpIndexer {
    client: reqwest::Client,
    url: String,
}

impl HttpIndexer {
    pub(crate) fn new(client: reqwest::Client, indexer_url: &str) -> Self {
        let url = format!("{}/token", indexer_url.trim_end_matches('/'));
        Self { client, url }
    }
}

#[async_trait]
impl TokenIndexer for HttpIndexer {
    async fn index(&self, token: &Token) -> Result<Value, CrawlerError> {
        let failed = |source| CrawlerError::Indexer {
            url: self.url.clone(),
            source,
        };
        self.client
            .post(&self.url)
            .json(token)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(failed)?
            .json()
            .await
            .map_err(failed)
    }
}
