use async_imap::error::Error as ImapError;
use chrono::{DateTime, Utc};

#[allow(unused_imports)]
use tracing::{debug, info, trace, warn};

/// Fetch attributes requested for every message.
pub(crate) const FETCH_ITEMS: &str = "(UID INTERNALDATE RFC822)";

// IMAP SINCE has day granularity and is inclusive, the exact timestamp
// filter happens after the fetch.
pub(crate) fn since_query(since: &DateTime<Utc>) -> String {
    format!("SINCE {}", since.format("%d-%b-%Y"))
}

// Only a dropped transport is worth a reconnect, a server that answered
// NO or BAD will answer the same way next time.
pub(crate) fn is_transport_abort(err: &ImapError) -> bool {
    match err {
        ImapError::ConnectionLost => true,
        ImapError::Io(io_err) => {
            debug!("IMAP transport error kind {:?}", io_err.kind());
            true
        }
        _ => false,
    }
}
