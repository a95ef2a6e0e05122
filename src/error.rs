use thiserror::Error;

/// What the supervisor should do with a failed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    /// The IMAP transport dropped; reconnect and resume from the watermark.
    Reconnect,
    /// Anything else; the process stops.
    Abort,
}

#[derive(Error, Debug)]
pub(crate) enum CrawlerError {
    #[error("Could not connect to IMAP server {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TLS handshake with IMAP server {host} failed: {source}")]
    Tls {
        host: String,
        #[source]
        source: async_native_tls::Error,
    },
    #[error("IMAP login as {user} failed: {source}")]
    Login {
        user: String,
        #[source]
        source: async_imap::error::Error,
    },
    #[error("IMAP session failed: {0}")]
    Imap(#[from] async_imap::error::Error),
    #[error("Parser {url} failed: {source}")]
    Parser {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Indexer {url} failed: {source}")]
    Indexer {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Message uid {0} is not a valid RFC 5322 message")]
    Malformed(u32),
    #[error("Failed to read message from stdin: {0}")]
    Stdin(#[source] std::io::Error),
}

impl CrawlerError {
    pub(crate) fn disposition(&self) -> Disposition {
        match self {
            CrawlerError::Imap(err) if crate::imap_util::is_transport_abort(err) => {
                Disposition::Reconnect
            }
            _ => Disposition::Abort,
        }
    }
}
