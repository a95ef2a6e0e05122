use crate::error::CrawlerError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// One structured result from a parser service. Opaque to the crawler.
pub(crate) type Token = Map<String, Value>;

#[async_trait]
pub(crate) trait TokenParser {
    async fn parse(&self, subject: &str, text: &str) -> Result<Vec<Token>, CrawlerError>;
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    subject: &'a str,
    message: &'a str,
}

/// Fans a message out to every configured parser service, in order.
pub(crate) struct HttpParser {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl HttpParser {
    pub(crate) fn new(client: reqwest::Client, parser_urls: Vec<String>) -> Self {
        let endpoints = parser_urls
            .iter()
            .map(|url| format!("{}/parse", url.trim_end_matches('/')))
            .collect();
        Self { client, endpoints }
    }
}

#[async_trait]
impl TokenParser for HttpParser {
    async fn parse(&self, subject: &str, text: &str) -> Result<Vec<Token>, CrawlerError> {
        let mut tokens = Vec::new();
        for url in &self.endpoints {
            trace!("Parsing with {}", url);
            let failed = |source| CrawlerError::Parser {
                url: url.clone(),
                source,
            };
            let parsed: Vec<Token> = self
                .client
                .post(url)
                .json(&ParseRequest {
                    subject,
                    message: text,
                })
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(failed)?
                .json()
                .await
                .map_err(failed)?;
            debug!("Parser {} returned {} tokens", url, parsed.len());
            tokens.extend(parsed);
        }
        Ok(tokens)
    }
}
