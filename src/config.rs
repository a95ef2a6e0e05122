use thiserror::Error;

const DEFAULT_IMAP_PORT: u16 = 993;
const DEFAULT_MAILBOX: &str = "INBOX";

#[derive(Error, Debug, PartialEq)]
pub(crate) enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("IMAP_URL has an invalid port: {0}")]
    InvalidPort(String),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub mailbox: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CrawlerConfig {
    /// `None` selects one-shot mode.
    pub imap: Option<ImapConfig>,
    pub indexer_url: String,
    /// Parser base URLs in `PARSER_1`, `PARSER_2`, ... order.
    pub parser_urls: Vec<String>,
}

impl CrawlerConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let indexer_url = lookup("INDEXER_URL")
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("INDEXER_URL"))?;

        let imap = match (lookup("IMAP_URL"), lookup("IMAP_USER"), lookup("IMAP_PASS")) {
            (Some(url), Some(user), Some(password))
                if !url.is_empty() && !user.is_empty() && !password.is_empty() =>
            {
                let (host, port) = split_host_port(&url)?;
                let mailbox = lookup("IMAP_MAILBOX").unwrap_or_else(|| DEFAULT_MAILBOX.to_string());
                Some(ImapConfig {
                    host,
                    port,
                    user,
                    password,
                    mailbox,
                })
            }
            _ => None,
        };

        Ok(Self {
            imap,
            indexer_url,
            parser_urls: parser_urls(&lookup),
        })
    }
}

// Dense enumeration: stops at the first missing index.
fn parser_urls<F>(lookup: &F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    (1..)
        .map_while(|index| lookup(&format!("PARSER_{index}")))
        .collect()
}

fn split_host_port(url: &str) -> Result<(String, u16), ConfigError> {
    match url.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.to_string()))?;
            Ok((host.to_string(), port))
        }
        None => Ok((url.to_string(), DEFAULT_IMAP_PORT)),
    }
}
