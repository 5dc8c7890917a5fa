//! Wire shapes of the Cloudflare v4 DNS records API.

use serde::{Deserialize, Serialize};

use crate::domain::RecordContent;

/// Error code Cloudflare returns when a DNS record id is unknown.
pub(super) const RECORD_NOT_FOUND_CODE: i64 = 81044;

#[derive(Debug, Serialize)]
pub(super) struct DnsRecordBody<'a> {
    #[serde(rename = "type")]
    pub(super) record_type: &'static str,
    pub(super) name: &'a str,
    pub(super) content: &'a str,
    pub(super) ttl: u32,
    pub(super) proxied: bool,
}

impl<'a> From<&'a RecordContent> for DnsRecordBody<'a> {
    fn from(content: &'a RecordContent) -> Self {
        Self {
            record_type: content.record_type.as_str(),
            name: content.name.as_ref(),
            content: content.value.as_ref(),
            ttl: content.ttl.seconds(),
            proxied: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct EnvelopeDto<T> {
    #[serde(default)]
    pub(super) success: bool,
    #[serde(default)]
    pub(super) errors: Vec<MessageDto>,
    pub(super) result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MessageDto {
    #[serde(default)]
    pub(super) code: i64,
    #[serde(default)]
    pub(super) message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecordIdDto {
    pub(super) id: String,
}

impl<T> EnvelopeDto<T> {
    /// First error message in the envelope, if any.
    pub(super) fn first_message(&self) -> Option<&str> {
        self.errors
            .first()
            .map(|error| error.message.as_str())
            .filter(|message| !message.trim().is_empty())
    }

    pub(super) fn reports_missing_record(&self) -> bool {
        self.errors
            .iter()
            .any(|error| error.code == RECORD_NOT_FOUND_CODE)
    }
}
