//! Transactional email client
//!
//! Thin wrapper over the email provider's send endpoint. The only
//! templated mail today is the order confirmation with the download link;
//! callers on the confirmation path treat failures as log-and-continue.

use reqwest::Client;
use serde::Serialize;

use vitrine_core::money::format_cents;
use vitrine_core::EmailConfig;

use crate::db::repos::{Order, OrderItem};

/// Email client errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email API rejected the request: {status} {detail}")]
    Api { status: u16, detail: String },
}

/// Send request body
#[derive(Debug, Serialize)]
struct SendRequest<'r> {
    from: &'r str,
    to: &'r str,
    subject: &'r str,
    html: &'r str,
}

/// Transactional email client
pub struct EmailClient {
    client: Client,
    base_url: String,
    api_key: String,
    from_address: String,
}

impl EmailClient {
    /// Create a client from the application email config.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        }
    }

    /// Send a single email.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let request = SendRequest {
            from: &self.from_address,
            to,
            subject,
            html,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(())
    }

    /// Send the order confirmation with receipt lines and download link.
    pub async fn send_order_confirmation(
        &self,
        order: &Order,
        items: &[OrderItem],
        public_url: &str,
    ) -> Result<(), EmailError> {
        let token = order.download_token.as_deref().unwrap_or_default();
        let html = render_confirmation(order, items, public_url, token);

        self.send(&order.email, "Your order is ready", &html).await
    }
}

fn render_confirmation(
    order: &Order,
    items: &[OrderItem],
    public_url: &str,
    token: &str,
) -> String {
    let mut lines = String::new();
    for item in items {
        lines.push_str(&format!(
            "<li>{} x{} - {}</li>",
            item.product_name,
            item.quantity,
            format_cents(item.unit_price_cents * item.quantity as i64)
        ));
    }

    format!(
        "<h1>Thanks for your order</h1>\
         <ul>{lines}</ul>\
         <p>Total: {total}</p>\
         <p><a href=\"{public_url}/download/{token}\">Download your files</a></p>",
        total = format_cents(order.total_cents),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn fixture() -> (Order, Vec<OrderItem>) {
        let order_id = Uuid::new_v4();
        let order = Order {
            id: order_id,
            email: "pat@shop.example".into(),
            payment_status: "completed".into(),
            payment_ref: Some("cs_1".into()),
            download_token: Some("tok123".into()),
            total_cents: 4998,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let items = vec![OrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: Some(Uuid::new_v4()),
            product_name: "Landing Page Kit".into(),
            unit_price_cents: 2499,
            quantity: 2,
        }];
        (order, items)
    }

    #[test]
    fn confirmation_contains_receipt_and_link() {
        let (order, items) = fixture();
        let html = render_confirmation(&order, &items, "https://shop.example", "tok123");

        assert!(html.contains("Landing Page Kit x2 - $49.98"));
        assert!(html.contains("Total: $49.98"));
        assert!(html.contains("https://shop.example/download/tok123"));
    }
}
