use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::AgentRecord;
use crate::error::{MarketError, Result};
use crate::money::Money;

/// Billing unit that turns a checkout into a recurring monthly charge.
pub const RECURRING_UNIT: &str = "month";
/// Unit used when a record's pricing has none.
pub const ONE_TIME_UNIT: &str = "one-time";

/// Incoming checkout request. `price` is left untyped so that bad input
/// is reported as a validation failure rather than a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(alias = "agentName", default)]
    pub name: String,
    #[serde(default)]
    pub price: Value,
    #[serde(alias = "unit", default = "default_unit")]
    pub billing_unit: String,
}

fn default_unit() -> String {
    ONE_TIME_UNIT.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Billing {
    /// Charged every month until cancelled.
    Monthly,
    OneTime,
}

impl Billing {
    pub fn from_unit(unit: &str) -> Self {
        if unit == RECURRING_UNIT {
            Billing::Monthly
        } else {
            Billing::OneTime
        }
    }
}

/// A checkout that passed validation and can go to the payment processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub name: String,
    pub amount: Money,
    pub billing: Billing,
}

/// Handle returned by the payment processor; the client redirects to `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl CheckoutRequest {
    /// Build the request the detail page would send for `record`.
    pub fn for_agent(record: &AgentRecord) -> Self {
        let price = record.pricing_details.price().unwrap_or(Money::ZERO);
        let unit = record.pricing_details.unit().unwrap_or(ONE_TIME_UNIT);
        Self {
            name: record.name.clone(),
            price: serde_json::json!(price),
            billing_unit: unit.to_string(),
        }
    }

    pub fn validate(&self) -> Result<ValidCheckout> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(MarketError::Validation("name must not be empty".into()));
        }
        let amount = match &self.price {
            Value::Number(n) => n.as_f64().and_then(Money::from_f64),
            Value::String(s) => Money::parse(s),
            _ => None,
        }
        .ok_or_else(|| MarketError::Validation(format!("price is not a number: {}", self.price)))?;
        if amount.cents() <= 0 {
            return Err(MarketError::Validation(format!(
                "price must be at least $0.01, got {amount}"
            )));
        }
        Ok(ValidCheckout {
            name: name.to_string(),
            amount,
            billing: Billing::from_unit(&self.billing_unit),
        })
    }
}
