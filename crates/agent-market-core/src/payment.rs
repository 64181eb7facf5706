use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::checkout::{Billing, CheckoutSession, ValidCheckout};
use crate::error::{MarketError, Result};

pub const STRIPE_API: &str = "https://api.stripe.com";

/// Creates hosted checkout sessions with an external payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, checkout: &ValidCheckout) -> Result<CheckoutSession>;
}

/// Stripe Checkout. One form-encoded request per session, no retries.
pub struct StripeGateway {
    http: Client,
    api_base: String,
    secret_key: String,
    currency: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            api_base: STRIPE_API.to_string(),
            secret_key: secret_key.into(),
            currency: "usd".to_string(),
            success_url: "http://localhost:3000/success".to_string(),
            cancel_url: "http://localhost:3000/".to_string(),
        }
    }

    /// Point at a different API host (a mock server in tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_ascii_lowercase();
        self
    }

    pub fn with_redirects(mut self, success_url: impl Into<String>, cancel_url: impl Into<String>) -> Self {
        self.success_url = success_url.into();
        self.cancel_url = cancel_url.into();
        self
    }

    /// Form fields for the session-creation call.
    pub fn session_form(&self, checkout: &ValidCheckout) -> Vec<(String, String)> {
        let item = "line_items[0]";
        let mut form = vec![
            (
                "mode".to_string(),
                match checkout.billing {
                    Billing::Monthly => "subscription",
                    Billing::OneTime => "payment",
                }
                .to_string(),
            ),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            (format!("{item}[quantity]"), "1".to_string()),
            (format!("{item}[price_data][currency]"), self.currency.clone()),
            (
                format!("{item}[price_data][product_data][name]"),
                checkout.name.clone(),
            ),
            (
                format!("{item}[price_data][unit_amount]"),
                checkout.amount.cents().to_string(),
            ),
        ];
        if checkout.billing == Billing::Monthly {
            form.push((
                format!("{item}[price_data][recurring][interval]"),
                "month".to_string(),
            ));
        }
        form
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(&self, checkout: &ValidCheckout) -> Result<CheckoutSession> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        debug!(name = %checkout.name, amount = %checkout.amount, "creating checkout session");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&self.session_form(checkout))
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!(status, "payment processor rejected checkout session");
            return Err(MarketError::Api { status, body });
        }
        let session: StripeSession = resp.json().await?;
        Ok(CheckoutSession {
            session_id: session.id,
            url: session.url,
        })
    }
}
