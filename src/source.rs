use crate::config::ImapConfig;
use crate::error::CrawlerError;
use crate::imap_util::{since_query, FETCH_ITEMS};
use crate::message::Message;
use crate::record::fill_record;
use async_imap::Client as AsyncImapClient;
use async_imap::Session;
use async_native_tls::{TlsConnector, TlsStream};
use async_std::net::TcpStream;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use tracing::{debug, info, trace, warn};

#[async_trait]
pub(crate) trait MessageSource {
    /// UIDs of messages on or after the day of `since`, ascending.
    async fn search(&mut self, since: &DateTime<Utc>) -> Result<Vec<u32>, CrawlerError>;

    async fn fetch(&mut self, uid: u32) -> Result<Option<Message>, CrawlerError>;

    /// End the session. Failures are logged, the session is dropped anyway.
    async fn logout(&mut self) {}
}

/// A logged-in IMAP session with the configured mailbox selected.
pub(crate) struct ImapSource {
    session: Session<TlsStream<TcpStream>>,
}

impl ImapSource {
    pub(crate) async fn connect(config: &ImapConfig) -> Result<Self, CrawlerError> {
        info!("IMAP host: {} port {}", &config.host, config.port);

        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .map_err(|source| CrawlerError::Connect {
                host: config.host.clone(),
                source,
            })?;
        let stream = TlsConnector::new()
            .use_sni(true)
            .connect(config.host.clone(), stream)
            .await
            .map_err(|source| CrawlerError::Tls {
                host: config.host.clone(),
                source,
            })?;

        let mut session = AsyncImapClient::new(stream)
            .login(&config.user, &config.password)
            .await
            .map_err(|(source, _client)| CrawlerError::Login {
                user: config.user.clone(),
                source,
            })?;
        session.select(&config.mailbox).await?;
        info!("IMAP selected mailbox {}", &config.mailbox);

        Ok(Self { session })
    }
}

#[async_trait]
impl MessageSource for ImapSource {
    async fn search(&mut self, since: &DateTime<Utc>) -> Result<Vec<u32>, CrawlerError> {
        let query = since_query(since);
        trace!("UID SEARCH {}", query);
        let mut uids: Vec<u32> = self.session.uid_search(&query).await?.into_iter().collect();
        uids.sort_unstable();
        debug!("{} matched {} messages", query, uids.len());
        Ok(uids)
    }

    async fn fetch(&mut self, uid: u32) -> Result<Option<Message>, CrawlerError> {
        let fetched: Vec<_> = self
            .session
            .uid_fetch(uid.to_string(), FETCH_ITEMS)
            .await?
            .try_collect()
            .await?;
        match fetched.iter().find(|item| item.uid == Some(uid)) {
            Some(item) => fill_record(uid, item),
            None => {
                warn!("UID FETCH {} returned nothing", uid);
                Ok(None)
            }
        }
    }

    async fn logout(&mut self) {
        if let Err(e) = self.session.logout().await {
            warn!("IMAP logout failed: {}", e);
        }
    }
}
