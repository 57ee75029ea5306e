use crate::config::GatewayConfig;
use crate::payments::gateway::{
    DonationRequest, GatewayError, GatewayReceipt, GatewayResult, PaymentGateway,
    WithdrawalRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// JSON-over-HTTP gateway client.
///
/// Submissions are sent exactly once; a transport failure is reported to the
/// flow instead of being retried here.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpPaymentGateway {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        idempotency_key: &str,
        body: &B,
    ) -> GatewayResult<GatewayReceipt> {
        let url = self.endpoint(path);
        let mut request = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Idempotency-Key", idempotency_key)
            .json(body);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::timeout(self.timeout)
            } else {
                GatewayError::Network {
                    message: format!("gateway request failed: {}", e),
                }
            }
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        debug!(url = %url, status = %status, "gateway responded");

        if status.is_success() {
            return parse_receipt(&text);
        }

        warn!(url = %url, status = %status, "gateway rejected submission");
        if status.is_client_error() {
            return Err(GatewayError::Declined {
                message: error_message(&text).unwrap_or_else(|| format!("HTTP {}", status)),
                provider_code: Some(status.as_u16().to_string()),
            });
        }

        Err(GatewayError::Provider {
            message: format!("HTTP {}: {}", status, text),
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn submit_donation(&self, request: DonationRequest) -> GatewayResult<GatewayReceipt> {
        self.post_json("donations", &request.client_reference, &request)
            .await
    }

    async fn submit_withdrawal(
        &self,
        request: WithdrawalRequest,
    ) -> GatewayResult<GatewayReceipt> {
        self.post_json("withdrawals", &request.client_reference, &request)
            .await
    }
}

fn parse_receipt(body: &str) -> GatewayResult<GatewayReceipt> {
    let receipt: GatewayReceipt =
        serde_json::from_str(body).map_err(|e| GatewayError::Provider {
            message: format!("invalid gateway JSON response: {}", e),
        })?;

    if receipt.reference_code.trim().is_empty() {
        return Err(GatewayError::Provider {
            message: "gateway returned an empty reference code".to_string(),
        });
    }

    Ok(receipt)
}

/// Pulls a human-readable reason out of an error body, if it has one
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
