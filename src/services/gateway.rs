//! Shared HTTP plumbing for the upstream verification services.
//!
//! Both the sender/OTP service and Brevo's domain API speak JSON over HTTPS
//! with an `api-key` header. [`GatewayClient`] owns the reqwest client, the
//! base URL and the optional credential, and turns every upstream reply into
//! either an [`UpstreamResponse`] or a typed [`GatewayError`]:
//!
//! - no credential configured: [`GatewayError::NotConfigured`], and no
//!   request is sent
//! - non-2xx status: [`GatewayError::Rejected`] with the upstream message
//! - 2xx carrying a `{"success": false}` envelope: also `Rejected`

use crate::models::verification::DnsRecord;
use reqwest::{header, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0} API key is not configured")]
    NotConfigured(&'static str),

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Upstream rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Upstream response did not confirm success")]
    MissingSuccessIndicator,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected upstream response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Message that is safe to show to the tenant.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Rejected { message, .. } => message.clone(),
            GatewayError::InvalidCode => "Invalid verification code".to_string(),
            GatewayError::MissingSuccessIndicator => {
                "The verification service did not confirm the request".to_string()
            }
            GatewayError::NotConfigured(_) => "Configuration error".to_string(),
            GatewayError::Transport(_) | GatewayError::Decode(_) => {
                "The verification service is unavailable, please retry".to_string()
            }
        }
    }
}

/// Outcome of registering an outbound sender identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedSender {
    pub id: String,
    pub spf_error: bool,
    pub dkim_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedDomain {
    pub id: Option<String>,
    pub dns_records: Vec<DnsRecord>,
}

/// Live authentication status of a sending domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainCheck {
    pub verified: bool,
    pub authenticated: bool,
    pub dns_records: Vec<DnsRecord>,
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl UpstreamResponse {
    /// The useful part of the body: `data` when the upstream wraps its reply
    /// in a `{success, data}` envelope, the whole body otherwise.
    pub fn payload(&self) -> Option<&Value> {
        let body = self.body.as_ref()?;
        match (body.get("success"), body.get("data")) {
            (Some(_), Some(data)) => Some(data),
            _ => Some(body),
        }
    }

    pub fn explicit_success(&self) -> Option<bool> {
        self.body
            .as_ref()
            .and_then(|body| body.get("success"))
            .and_then(Value::as_bool)
    }
}

#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    service: &'static str,
    base_url: String,
    api_key: Option<String>,
}

impl GatewayClient {
    pub fn new(
        service: &'static str,
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GatewayError::NotConfigured(self.service))?;

        let mut request = self
            .client
            .request(method.clone(), self.url(path))
            .header("api-key", api_key)
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(service = self.service, %method, path, "calling upstream");
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let parsed: Option<Value> = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        if !(200..300).contains(&status) {
            let message = parsed
                .as_ref()
                .and_then(upstream_message)
                .unwrap_or_else(|| fallback_message(status, &text));
            tracing::warn!(service = self.service, status, %message, "upstream rejected request");
            return Err(GatewayError::Rejected { status, message });
        }

        if !text.trim().is_empty() && parsed.is_none() {
            return Err(GatewayError::Decode(format!(
                "{} returned a non-JSON body",
                self.service
            )));
        }

        let response = UpstreamResponse {
            status,
            body: parsed,
        };
        if response.explicit_success() == Some(false) {
            let message = response
                .body
                .as_ref()
                .and_then(upstream_message)
                .unwrap_or_else(|| "request was not accepted".to_string());
            tracing::warn!(service = self.service, status, %message, "upstream returned failure envelope");
            return Err(GatewayError::Rejected { status, message });
        }

        Ok(response)
    }
}

/// Pull a human readable message out of an upstream error body.
fn upstream_message(body: &Value) -> Option<String> {
    for key in ["message", "error"] {
        match body.get(key) {
            Some(Value::String(message)) if !message.is_empty() => return Some(message.clone()),
            Some(Value::Object(inner)) => {
                if let Some(Value::String(message)) = inner.get("message") {
                    return Some(message.clone());
                }
            }
            _ => {}
        }
    }
    None
}

fn fallback_message(status: u16, text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.len() > 200 {
        format!("upstream returned status {}", status)
    } else {
        trimmed.to_string()
    }
}

/// Accepts string or numeric identifiers; Brevo returns numbers.
pub(crate) fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalize upstream DNS records into a sorted list.
///
/// Brevo answers with an object keyed by record name
/// (`{"dkim_record": {"type", "value", "host_name", "status"}, ...}`); a plain
/// array of records is accepted as well.
pub fn parse_dns_records(value: Option<&Value>) -> Result<Vec<DnsRecord>, GatewayError> {
    let mut records = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, record)| dns_record(name.clone(), record))
            .collect::<Result<Vec<_>, _>>()?,
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let name = record
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("record_{}", index + 1));
                dns_record(name, record)
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(GatewayError::Decode(format!(
                "dns_records has unexpected shape: {}",
                other
            )))
        }
    };
    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}

fn dns_record(name: String, record: &Value) -> Result<DnsRecord, GatewayError> {
    if !record.is_object() {
        return Err(GatewayError::Decode(format!(
            "dns record {} is not an object",
            name
        )));
    }
    let text = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let record_type = match text("type") {
        t if t.is_empty() => text("record_type"),
        t => t,
    };

    Ok(DnsRecord {
        name,
        record_type: record_type.to_ascii_uppercase(),
        host_name: text("host_name"),
        value: text("value"),
        status: record
            .get("status")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}
