//! Outbound header reconstruction.
//!
//! The switch never forwards a peer's headers as they are: every outbound
//! message carries headers rebuilt from its kind, the correlation entry it
//! answers and the switch's own identity.

use crate::domain::correlation::{CorrelationMap, RequestMapEntry};
use crate::domain::message::{
    HEADER_ACCEPT, HEADER_CONTENT_TYPE, HEADER_DATE, HEADER_DESTINATION, HEADER_SOURCE, Headers,
    MessageKind, QUOTES_MEDIA_TYPE, TRANSFERS_MEDIA_TYPE,
};
use crate::error::{NotFoundKind, Result, SwitchError};
use chrono::{DateTime, Utc};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Everything an outbound header set is derived from.
#[derive(Debug, Clone, Copy)]
pub struct HeaderInputs<'a> {
    pub kind: MessageKind,
    /// `date` header of the inbound request.
    pub date: Option<&'a str>,
    pub own_id: &'a str,
    pub next_hop: &'a str,
    /// Id the correlated entry was looked up by.
    pub correlation_id: &'a str,
    /// The entry the message answers (PUTs) or continues (transfer POST).
    pub correlated: Option<&'a RequestMapEntry>,
}

impl<'a> HeaderInputs<'a> {
    fn require(&self, map: CorrelationMap) -> Result<&'a RequestMapEntry> {
        self.correlated.ok_or_else(|| {
            SwitchError::not_found(NotFoundKind::Request(map), self.correlation_id)
        })
    }
}

/// Builds the outbound headers for a message.
///
/// GET and error callbacks only get source and destination.
pub fn rewrite_headers(inputs: &HeaderInputs<'_>, now: DateTime<Utc>) -> Result<Headers> {
    let mut headers = Headers::new();
    headers.insert(HEADER_DATE.to_string(), normalize_date(inputs.date, now));
    headers.insert(HEADER_SOURCE.to_string(), inputs.own_id.to_string());

    let (destination, media_type) = match inputs.kind {
        MessageKind::QuoteError
        | MessageKind::TransferError
        | MessageKind::QuoteGet
        | MessageKind::TransferGet => (Some(inputs.next_hop), None),
        MessageKind::QuotePost => (None, Some(QUOTES_MEDIA_TYPE)),
        MessageKind::QuotePut => {
            let quote_post = inputs.require(CorrelationMap::QuotePost)?;
            (Some(quote_post.requester()), Some(QUOTES_MEDIA_TYPE))
        }
        MessageKind::TransferPost => {
            let quote_put = inputs.require(CorrelationMap::QuotePut)?;
            (Some(quote_put.recorded_destination()), Some(TRANSFERS_MEDIA_TYPE))
        }
        MessageKind::TransferPut => {
            let transfer_post = inputs.require(CorrelationMap::TransferPost)?;
            (Some(transfer_post.requester()), Some(TRANSFERS_MEDIA_TYPE))
        }
    };

    if let Some(destination) = destination {
        headers.insert(HEADER_DESTINATION.to_string(), destination.to_string());
    }
    if let Some(media_type) = media_type {
        headers.insert(HEADER_CONTENT_TYPE.to_string(), media_type.to_string());
        headers.insert(HEADER_ACCEPT.to_string(), media_type.to_string());
    }
    Ok(headers)
}

/// Re-emits an inbound `date` header in UTC HTTP-date form. A missing or
/// unparseable date is replaced by `now`.
pub fn normalize_date(raw: Option<&str>, now: DateTime<Utc>) -> String {
    raw.and_then(|raw| {
        DateTime::parse_from_rfc2822(raw.trim())
            .or_else(|_| DateTime::parse_from_rfc3339(raw.trim()))
            .ok()
    })
    .map(|date| date.with_timezone(&Utc))
    .unwrap_or(now)
    .format(HTTP_DATE_FORMAT)
    .to_string()
}
