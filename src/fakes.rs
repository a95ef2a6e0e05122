//! In-memory stand-ins for the mailbox, parser and indexer seams.

use crate::error::CrawlerError;
use crate::indexer::TokenIndexer;
use crate::message::{Body, Message};
use crate::parser::{Token, TokenParser};
use crate::source::MessageSource;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub(crate) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 6, hour, 0, 0).unwrap()
}

pub(crate) fn message(uid: u32, hour: u32, subject: &str, text: Option<&str>) -> Message {
    Message {
        uid,
        message_id: Some(format!("{uid}@example.com")),
        subject: subject.to_string(),
        date: at(hour).fixed_offset(),
        body: Body {
            plain: text.map(|t| vec![t.to_string()]).unwrap_or_default(),
            html: Vec::new(),
        },
    }
}

// A real reqwest error, as a refused HTTP call would carry one.
fn http_error() -> reqwest::Error {
    reqwest::Client::new()
        .post("not a url")
        .build()
        .unwrap_err()
}

/// What happened to a mailbox, shared across the sessions opened on it.
#[derive(Clone, Default)]
pub(crate) struct SourceLog {
    fetched: Arc<Mutex<Vec<u32>>>,
    logouts: Arc<Mutex<usize>>,
}

impl SourceLog {
    pub(crate) fn fetched(&self) -> Vec<u32> {
        self.fetched.lock().unwrap().clone()
    }

    pub(crate) fn logouts(&self) -> usize {
        *self.logouts.lock().unwrap()
    }
}

pub(crate) struct FakeSource {
    messages: BTreeMap<u32, Message>,
    drop_at: Option<u32>,
    log: SourceLog,
}

impl FakeSource {
    pub(crate) fn new(messages: Vec<Message>) -> Self {
        Self {
            messages: messages.into_iter().map(|m| (m.uid, m)).collect(),
            drop_at: None,
            log: SourceLog::default(),
        }
    }

    /// Lose the connection when `uid` is fetched.
    pub(crate) fn dropping_at(mut self, uid: u32) -> Self {
        self.drop_at = Some(uid);
        self
    }

    pub(crate) fn with_log(mut self, log: &SourceLog) -> Self {
        self.log = log.clone();
        self
    }

    pub(crate) fn log(&self) -> SourceLog {
        self.log.clone()
    }
}

#[async_trait]
impl MessageSource for FakeSource {
    async fn search(&mut self, _since: &DateTime<Utc>) -> Result<Vec<u32>, CrawlerError> {
        Ok(self.messages.keys().copied().collect())
    }

    async fn fetch(&mut self, uid: u32) -> Result<Option<Message>, CrawlerError> {
        self.log.fetched.lock().unwrap().push(uid);
        if self.drop_at == Some(uid) {
            return Err(async_imap::error::Error::ConnectionLost.into());
        }
        Ok(self.messages.get(&uid).cloned())
    }

    async fn logout(&mut self) {
        *self.log.logouts.lock().unwrap() += 1;
    }
}

/// Splits text on whitespace. Fails like an unreachable parser for "boom".
#[derive(Clone, Default)]
pub(crate) struct FakeParser {
    seen: Arc<Mutex<Vec<String>>>,
}

impl FakeParser {
    pub(crate) fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenParser for FakeParser {
    async fn parse(&self, _subject: &str, text: &str) -> Result<Vec<Token>, CrawlerError> {
        self.seen.lock().unwrap().push(text.to_string());
        if text.trim() == "boom" {
            return Err(CrawlerError::Parser {
                url: "http://parser.test/parse".into(),
                source: http_error(),
            });
        }
        Ok(text
            .split_whitespace()
            .map(|word| {
                let mut token = Token::new();
                token.insert("token".into(), json!(word));
                token
            })
            .collect())
    }
}

/// Records tokens, refusing those whose `token` value is in `reject`.
#[derive(Clone, Default)]
pub(crate) struct FakeIndexer {
    indexed: Arc<Mutex<Vec<Token>>>,
    reject: Vec<&'static str>,
}

impl FakeIndexer {
    pub(crate) fn rejecting(reject: &[&'static str]) -> Self {
        Self {
            reject: reject.to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn indexed(&self) -> Vec<Token> {
        self.indexed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenIndexer for FakeIndexer {
    async fn index(&self, token: &Token) -> Result<Value, CrawlerError> {
        if self.reject.iter().any(|r| token["token"] == *r) {
            return Err(CrawlerError::Indexer {
                url: "http://indexer.test/token".into(),
                source: http_error(),
            });
        }
        self.indexed.lock().unwrap().push(token.clone());
        Ok(json!({"ok": true}))
    }
}
