//! Payment gateway client
//!
//! Direct REST integration with the hosted-checkout gateway. The storefront
//! creates a checkout session at order time and later asks the gateway
//! whether the session was paid; it never touches card data itself.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vitrine_core::PaymentConfig;

/// Gateway client errors
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment gateway rejected the request: {status} {detail}")]
    Api { status: u16, detail: String },
}

/// A created hosted-checkout session
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Current state of a checkout session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatus {
    pub id: String,
    /// "pending", "paid", or "expired"
    pub status: String,
}

impl SessionStatus {
    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }

    pub fn is_expired(&self) -> bool {
        self.status == "expired"
    }
}

/// Request body for session creation
#[derive(Debug, Serialize)]
struct CreateSessionRequest<'r> {
    amount_cents: i64,
    currency: &'r str,
    customer_email: &'r str,
    reference: String,
    success_url: String,
    cancel_url: String,
}

/// Payment gateway client
pub struct PaymentClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl PaymentClient {
    /// Create a client from the application payment config.
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_url.clone(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Create a hosted-checkout session for an order.
    pub async fn create_checkout(
        &self,
        order_id: Uuid,
        customer_email: &str,
        amount_cents: i64,
        public_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let request = CreateSessionRequest {
            amount_cents,
            currency: "usd",
            customer_email,
            reference: order_id.to_string(),
            success_url: format!("{}/orders/{}?paid=1", public_url, order_id),
            cancel_url: format!("{}/orders/{}?cancelled=1", public_url, order_id),
        };

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&request)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Look up a session's current status.
    pub async fn get_session(&self, session_id: &str) -> Result<SessionStatus, PaymentError> {
        let response = self
            .client
            .get(format!("{}/checkout/sessions/{}", self.base_url, session_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_status_flags() {
        let paid = SessionStatus {
            id: "cs_1".into(),
            status: "paid".into(),
        };
        assert!(paid.is_paid());
        assert!(!paid.is_expired());

        let expired = SessionStatus {
            id: "cs_2".into(),
            status: "expired".into(),
        };
        assert!(!expired.is_paid());
        assert!(expired.is_expired());
    }
}
