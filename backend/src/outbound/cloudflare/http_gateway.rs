//! Reqwest-backed Cloudflare DNS gateway.
//!
//! This adapter owns transport details only: request serialisation, bearer
//! authentication, timeout and HTTP error mapping. It performs exactly one
//! request per port call.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::warn;
use zeroize::Zeroizing;

use super::dto::{DnsRecordBody, EnvelopeDto, RecordIdDto};
use crate::domain::ports::{DnsGateway, DnsGatewayError};
use crate::domain::{RecordContent, RemoteRecordId};

/// Public Cloudflare v4 API root.
pub const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "subdomain-registry/0.1";

/// Zone, credential and transport settings for the gateway.
///
/// The zone id and token are optional so the service can start without
/// them; calls then fail with a configuration error.
#[derive(Clone)]
pub struct CloudflareConfig {
    pub api_base: Url,
    pub zone_id: Option<String>,
    pub api_token: Option<Zeroizing<String>>,
    pub timeout: Duration,
}

impl CloudflareConfig {
    /// Configuration against the public API with the default timeout.
    pub fn new(zone_id: Option<String>, api_token: Option<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            api_base: Url::parse(DEFAULT_CLOUDFLARE_API_BASE)?,
            zone_id,
            api_token: api_token.map(Zeroizing::new),
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

impl fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_base", &self.api_base.as_str())
            .field("zone_id", &self.zone_id)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// DNS gateway bound to one Cloudflare zone.
pub struct CloudflareHttpGateway {
    client: Client,
    api_base: String,
    zone_id: Option<String>,
    api_token: Option<Zeroizing<String>>,
}

impl CloudflareHttpGateway {
    /// Build a gateway using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: CloudflareConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.as_str().trim_end_matches('/').to_owned(),
            zone_id: non_blank(config.zone_id),
            api_token: config
                .api_token
                .filter(|token| !token.trim().is_empty()),
        })
    }

    fn records_url(&self) -> Result<String, DnsGatewayError> {
        let zone_id = self
            .zone_id
            .as_deref()
            .ok_or_else(|| DnsGatewayError::configuration("Cloudflare zone id is not set"))?;
        Ok(format!("{}/zones/{zone_id}/dns_records", self.api_base))
    }

    fn token(&self) -> Result<&str, DnsGatewayError> {
        self.api_token
            .as_ref()
            .map(|token| token.as_str())
            .ok_or_else(|| DnsGatewayError::configuration("Cloudflare API token is not set"))
    }

    fn authorised(&self, request: RequestBuilder) -> Result<RequestBuilder, DnsGatewayError> {
        Ok(request
            .bearer_auth(self.token()?)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: Option<&RemoteRecordId>,
    ) -> Result<Option<T>, DnsGatewayError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_failure(status, body.as_ref(), target));
        }

        let envelope: EnvelopeDto<T> = serde_json::from_slice(body.as_ref()).map_err(|error| {
            DnsGatewayError::provider(
                format!("invalid Cloudflare response: {error}"),
                Some(status.as_u16()),
            )
        })?;
        if !envelope.success {
            return Err(map_failure(status, body.as_ref(), target));
        }
        Ok(envelope.result)
    }
}

#[async_trait]
impl DnsGateway for CloudflareHttpGateway {
    async fn create(&self, content: &RecordContent) -> Result<RemoteRecordId, DnsGatewayError> {
        let url = self.records_url()?;
        let request = self
            .authorised(self.client.post(url))?
            .json(&DnsRecordBody::from(content));
        let created: Option<RecordIdDto> = self.execute(request, None).await?;
        created
            .and_then(|record| RemoteRecordId::new(record.id))
            .ok_or_else(|| {
                DnsGatewayError::provider("Cloudflare returned no record id", None::<u16>)
            })
    }

    async fn update(
        &self,
        remote_id: &RemoteRecordId,
        content: &RecordContent,
    ) -> Result<(), DnsGatewayError> {
        let url = format!("{}/{remote_id}", self.records_url()?);
        let request = self
            .authorised(self.client.put(url))?
            .json(&DnsRecordBody::from(content));
        self.execute::<IgnoredAny>(request, Some(remote_id))
            .await
            .map(|_| ())
    }

    async fn delete(&self, remote_id: &RemoteRecordId) -> Result<(), DnsGatewayError> {
        let url = format!("{}/{remote_id}", self.records_url()?);
        let request = self.authorised(self.client.delete(url))?;
        self.execute::<IgnoredAny>(request, Some(remote_id))
            .await
            .map(|_| ())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn map_transport_error(error: reqwest::Error) -> DnsGatewayError {
    if error.is_timeout() {
        DnsGatewayError::timeout(error.to_string())
    } else {
        DnsGatewayError::transport(error.to_string())
    }
}

/// Translate a failed response. `target` is the record the call addressed,
/// used to recognise "already gone" answers.
fn map_failure(
    status: StatusCode,
    body: &[u8],
    target: Option<&RemoteRecordId>,
) -> DnsGatewayError {
    let envelope: Option<EnvelopeDto<IgnoredAny>> = serde_json::from_slice(body).ok();

    if let Some(remote_id) = target {
        // A bare 404 means the record is gone; a 404 naming another error
        // (bad zone, bad route) does not.
        let missing = match envelope.as_ref() {
            Some(envelope) if !envelope.errors.is_empty() => envelope.reports_missing_record(),
            _ => status == StatusCode::NOT_FOUND,
        };
        if missing {
            return DnsGatewayError::remote_record_missing(remote_id.to_string());
        }
    }

    let message = match envelope.as_ref().and_then(EnvelopeDto::first_message) {
        Some(message) => message.to_owned(),
        None => {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("Cloudflare returned status {}", status.as_u16())
            } else {
                format!("Cloudflare returned status {}: {preview}", status.as_u16())
            }
        }
    };
    warn!(status = status.as_u16(), %message, "Cloudflare rejected DNS request");
    DnsGatewayError::provider(message, Some(status.as_u16()))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for request shaping and failure mapping without the network.

    use super::*;
    use crate::domain::{ParentDomain, RecordName, RecordType, RecordValue, Ttl};
    use rstest::rstest;

    fn content(record_type: RecordType, value: &str) -> RecordContent {
        let parent = ParentDomain::new("example.com").expect("parent");
        RecordContent {
            name: RecordName::qualify("alice", &parent).expect("name"),
            record_type,
            value: RecordValue::for_type(record_type, value).expect("value"),
            ttl: Ttl::new(None).expect("ttl"),
        }
    }

    fn remote() -> RemoteRecordId {
        RemoteRecordId::new("cf-123").expect("remote id")
    }

    fn gateway(zone_id: Option<&str>, token: Option<&str>) -> CloudflareHttpGateway {
        let config = CloudflareConfig::new(zone_id.map(str::to_owned), token.map(str::to_owned))
            .expect("config");
        CloudflareHttpGateway::new(config).expect("client")
    }

    #[test]
    fn serialises_records_unproxied() {
        let content = content(RecordType::Txt, "hello");
        let body = serde_json::to_value(DnsRecordBody::from(&content)).expect("json");
        assert_eq!(
            body,
            serde_json::json!({
                "type": "TXT",
                "name": "alice.example.com",
                "content": "\"hello\"",
                "ttl": 1,
                "proxied": false,
            })
        );
    }

    #[rstest]
    #[case::no_zone(None, Some("token"), "zone id")]
    #[case::blank_zone(Some("  "), Some("token"), "zone id")]
    #[case::no_token(Some("zone"), None, "API token")]
    #[tokio::test]
    async fn missing_credentials_fail_before_any_request(
        #[case] zone_id: Option<&str>,
        #[case] token: Option<&str>,
        #[case] fragment: &str,
    ) {
        let gateway = gateway(zone_id, token);
        let error = gateway
            .create(&content(RecordType::A, "192.0.2.1"))
            .await
            .expect_err("configuration error");
        assert!(matches!(error, DnsGatewayError::Configuration { .. }));
        assert!(error.to_string().contains(fragment), "{error}");
        assert!(!error.is_transient());
    }

    #[test]
    fn provider_message_comes_from_first_envelope_error() {
        let body = br#"{"success":false,"errors":[{"code":81057,"message":"Record already exists."}],"result":null}"#;
        let error = map_failure(StatusCode::BAD_REQUEST, body, None);
        assert_eq!(
            error,
            DnsGatewayError::provider("Record already exists.", 400_u16)
        );
        assert!(!error.is_transient());
    }

    #[test]
    fn unparseable_bodies_fall_back_to_a_preview() {
        let error = map_failure(StatusCode::BAD_GATEWAY, b"<html> upstream   down </html>", None);
        assert_eq!(error.to_string(), "Cloudflare returned status 502: <html> upstream down </html>");
        assert!(error.is_transient());
    }

    #[rstest]
    #[case::not_found_status(StatusCode::NOT_FOUND, b"".as_slice())]
    #[case::not_found_empty_envelope(
        StatusCode::NOT_FOUND,
        br#"{"success":false,"errors":[],"result":null}"#.as_slice()
    )]
    #[case::not_found_code(
        StatusCode::BAD_REQUEST,
        br#"{"success":false,"errors":[{"code":81044,"message":"Record does not exist."}]}"#.as_slice()
    )]
    fn missing_records_are_recognised(#[case] status: StatusCode, #[case] body: &[u8]) {
        let error = map_failure(status, body, Some(&remote()));
        assert_eq!(error, DnsGatewayError::remote_record_missing("cf-123"));
    }

    #[rstest]
    #[case::unroutable(
        br#"{"success":false,"errors":[{"code":7003,"message":"Could not route to /zones/bad/dns_records/cf-123, perhaps your object identifier is invalid?"}]}"#.as_slice()
    )]
    #[case::unknown_zone(
        br#"{"success":false,"errors":[{"code":1001,"message":"Invalid zone identifier"}]}"#.as_slice()
    )]
    fn not_found_naming_another_error_is_a_provider_error(#[case] body: &[u8]) {
        let error = map_failure(StatusCode::NOT_FOUND, body, Some(&remote()));
        assert!(
            matches!(error, DnsGatewayError::Provider { status: Some(404), .. }),
            "{error:?}"
        );
    }

    #[test]
    fn not_found_without_a_target_is_a_provider_error() {
        let error = map_failure(StatusCode::NOT_FOUND, b"", None);
        assert!(matches!(error, DnsGatewayError::Provider { status: Some(404), .. }));
    }

    #[test]
    fn long_previews_are_truncated() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }
}
