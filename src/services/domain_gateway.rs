use crate::config::GatewayConfig;
use crate::services::gateway::{
    id_string, parse_dns_records, CreatedDomain, DomainCheck, GatewayClient, GatewayError,
};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

/// Custom sending domain registration and DNS authentication.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait DomainGateway: Send + Sync {
    async fn create_domain(&self, name: &str) -> Result<CreatedDomain, GatewayError>;
    async fn validate_domain(&self, name: &str) -> Result<DomainCheck, GatewayError>;
    /// Ask the upstream to authenticate the domain. Authentication completes
    /// asynchronously, so success here does not mean `authenticated` yet.
    async fn authenticate_domain(&self, name: &str) -> Result<String, GatewayError>;
}

/// Brevo `/senders/domains` API.
pub struct BrevoDomainGateway {
    client: GatewayClient,
}

impl BrevoDomainGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: GatewayClient::new(
                "Brevo",
                &config.brevo_api_url,
                config.brevo_api_key.clone(),
                config.timeout,
            )?,
        })
    }
}

#[async_trait]
impl DomainGateway for BrevoDomainGateway {
    async fn create_domain(&self, name: &str) -> Result<CreatedDomain, GatewayError> {
        let response = self
            .client
            .send(
                Method::POST,
                "senders/domains",
                Some(&json!({ "name": name })),
            )
            .await?;

        let payload = response
            .payload()
            .ok_or_else(|| GatewayError::Decode("empty domain response".to_string()))?;

        Ok(CreatedDomain {
            id: id_string(payload.get("id")),
            dns_records: parse_dns_records(payload.get("dns_records"))?,
        })
    }

    async fn validate_domain(&self, name: &str) -> Result<DomainCheck, GatewayError> {
        let response = self
            .client
            .send(Method::GET, &format!("senders/domains/{}", name), None)
            .await?;

        let payload = response
            .payload()
            .ok_or_else(|| GatewayError::Decode("empty domain status".to_string()))?;
        let flag = |key: &str| payload.get(key).and_then(Value::as_bool).unwrap_or(false);

        Ok(DomainCheck {
            verified: flag("verified"),
            authenticated: flag("authenticated"),
            dns_records: parse_dns_records(payload.get("dns_records"))?,
        })
    }

    async fn authenticate_domain(&self, name: &str) -> Result<String, GatewayError> {
        let response = self
            .client
            .send(
                Method::PUT,
                &format!("senders/domains/{}/authenticate", name),
                None,
            )
            .await?;

        let message = response
            .payload()
            .and_then(|payload| payload.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("Domain authentication requested")
            .to_string();
        tracing::info!(domain = name, %message, "domain authentication requested");
        Ok(message)
    }
}
