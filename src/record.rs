#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

use crate::error::CrawlerError;
use crate::message::{Body, Message};
use async_imap::types::Fetch;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use mail_parser::PartType;

// Build a Message from a FETCH response. `None` when the server sent no body.
pub(crate) fn fill_record(uid: u32, item: &Fetch) -> Result<Option<Message>, CrawlerError> {
    let Some(raw) = item.body() else {
        warn!("FETCH for uid {} returned no RFC822 body", uid);
        return Ok(None);
    };
    let uid = item.uid.unwrap_or(uid);
    let fallback = item
        .internal_date()
        .unwrap_or_else(|| Utc::now().fixed_offset());
    decode_message(uid, raw, fallback).map(Some)
}

/// Decode a raw RFC 5322 message. `fallback_date` is used when the message
/// has no parseable Date header.
pub(crate) fn decode_message(
    uid: u32,
    raw: &[u8],
    fallback_date: DateTime<FixedOffset>,
) -> Result<Message, CrawlerError> {
    let parsed = mail_parser::MessageParser::default()
        .parse(raw)
        .ok_or(CrawlerError::Malformed(uid))?;

    let date = parsed.date().and_then(to_chrono).unwrap_or_else(|| {
        debug!("uid {} has no usable Date header, using {}", uid, fallback_date);
        fallback_date
    });

    let mut body = Body::default();
    // mail-parser mirrors an html-only body into text_body (and vice versa),
    // so keep each part only under the representation it really is.
    for part in parsed.text_body.iter().filter_map(|id| parsed.part(*id)) {
        if let PartType::Text(text) = &part.body {
            body.plain.push(text.to_string());
        }
    }
    for part in parsed.html_body.iter().filter_map(|id| parsed.part(*id)) {
        if let PartType::Html(html) = &part.body {
            body.html.push(html.to_string());
        }
    }

    Ok(Message {
        uid,
        message_id: parsed.message_id().map(str::to_string),
        subject: parsed.subject().unwrap_or_default().to_string(),
        date,
        body,
    })
}

fn to_chrono(date: &mail_parser::DateTime) -> Option<DateTime<FixedOffset>> {
    let offset_secs = (i32::from(date.tz_hour) * 3600 + i32::from(date.tz_minute) * 60)
        * if date.tz_before_gmt { -1 } else { 1 };
    let offset = FixedOffset::east_opt(offset_secs)?;
    NaiveDate::from_ymd_opt(
        i32::from(date.year),
        u32::from(date.month),
        u32::from(date.day),
    )?
    .and_hms_opt(
        u32::from(date.hour),
        u32::from(date.minute),
        u32::from(date.second),
    )?
    .and_local_timezone(offset)
    .single()
}
