use crate::config::GatewayConfig;
use crate::services::gateway::{id_string, CreatedSender, GatewayClient, GatewayError};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

/// Outbound sender identities and their OTP confirmation.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SenderGateway: Send + Sync {
    async fn create_sender(&self, email: &str, name: &str) -> Result<CreatedSender, GatewayError>;
    async fn validate_otp(&self, code: &str, sender_id: &str) -> Result<(), GatewayError>;
}

pub struct HttpSenderGateway {
    client: GatewayClient,
}

impl HttpSenderGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: GatewayClient::new(
                "sender",
                &config.sender_api_url,
                config.sender_api_key.clone(),
                config.timeout,
            )?,
        })
    }
}

#[async_trait]
impl SenderGateway for HttpSenderGateway {
    async fn create_sender(&self, email: &str, name: &str) -> Result<CreatedSender, GatewayError> {
        let response = self
            .client
            .send(
                Method::POST,
                "senders",
                Some(&json!({ "name": name, "email": email })),
            )
            .await?;

        let payload = response
            .payload()
            .ok_or_else(|| GatewayError::Decode("empty sender response".to_string()))?;
        let id = id_string(payload.get("id"))
            .ok_or_else(|| GatewayError::Decode("sender response has no id".to_string()))?;
        let flag = |key: &str| payload.get(key).and_then(Value::as_bool).unwrap_or(false);

        tracing::info!(sender_id = %id, "sender registered upstream");
        Ok(CreatedSender {
            id,
            spf_error: flag("spfError"),
            dkim_error: flag("dkimError"),
        })
    }

    async fn validate_otp(&self, code: &str, sender_id: &str) -> Result<(), GatewayError> {
        let path = format!("senders/{}/validate", sender_id);
        let response = match self
            .client
            .send(Method::PUT, &path, Some(&json!({ "otp": code })))
            .await
        {
            Ok(response) => response,
            Err(GatewayError::Rejected { status, message })
                if status == 400 || status == 422 || (200..300).contains(&status) =>
            {
                tracing::info!(sender_id, %message, "otp rejected upstream");
                return Err(GatewayError::InvalidCode);
            }
            Err(e) => return Err(e),
        };

        // 204 is Brevo's explicit success; anything else must say so itself.
        if response.status == 204 || response.explicit_success() == Some(true) {
            Ok(())
        } else {
            Err(GatewayError::MissingSuccessIndicator)
        }
    }
}
