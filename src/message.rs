use chrono::{DateTime, FixedOffset};

/// Alternative textual representations of a message body.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Body {
    pub plain: Vec<String>,
    pub html: Vec<String>,
}

/// A decoded message, owned and detached from the IMAP response it came from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Message {
    pub uid: u32,
    pub message_id: Option<String>,
    /// Empty when the message has no Subject header.
    pub subject: String,
    pub date: DateTime<FixedOffset>,
    pub body: Body,
}
