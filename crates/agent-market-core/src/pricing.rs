use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Billing model tag. The label doubles as the display price on a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingModel {
    Free,
    Subscription,
    #[serde(rename = "Pay-as-you-go")]
    PayAsYouGo,
    Freemium,
}

impl BillingModel {
    pub const ALL: [BillingModel; 4] = [
        BillingModel::Free,
        BillingModel::Freemium,
        BillingModel::Subscription,
        BillingModel::PayAsYouGo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Subscription => "Subscription",
            Self::PayAsYouGo => "Pay-as-you-go",
            Self::Freemium => "Freemium",
        }
    }
}

impl fmt::Display for BillingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BillingModel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "subscription" | "sub" => Ok(Self::Subscription),
            "pay-as-you-go" | "payg" | "pay_as_you_go" => Ok(Self::PayAsYouGo),
            "freemium" => Ok(Self::Freemium),
            other => Err(format!("unknown billing model: {other}")),
        }
    }
}

/// How an agent charges. Each variant carries only the fields it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum PricingDescriptor {
    Free,
    Subscription {
        price: Money,
        unit: String,
    },
    #[serde(rename = "Pay-as-you-go")]
    PayAsYouGo {
        price: Money,
        unit: String,
    },
    Freemium {
        price: Money,
        unit: String,
        #[serde(rename = "freeTierLimit")]
        free_tier_limit: u64,
    },
}

impl PricingDescriptor {
    pub fn model(&self) -> BillingModel {
        match self {
            Self::Free => BillingModel::Free,
            Self::Subscription { .. } => BillingModel::Subscription,
            Self::PayAsYouGo { .. } => BillingModel::PayAsYouGo,
            Self::Freemium { .. } => BillingModel::Freemium,
        }
    }

    /// Fixed charge or per-unit rate, depending on the model.
    pub fn price(&self) -> Option<Money> {
        match self {
            Self::Free => None,
            Self::Subscription { price, .. }
            | Self::PayAsYouGo { price, .. }
            | Self::Freemium { price, .. } => Some(*price),
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::Free => None,
            Self::Subscription { unit, .. }
            | Self::PayAsYouGo { unit, .. }
            | Self::Freemium { unit, .. } => Some(unit),
        }
    }

    pub fn free_tier_limit(&self) -> Option<u64> {
        match self {
            Self::Freemium {
                free_tier_limit, ..
            } => Some(*free_tier_limit),
            _ => None,
        }
    }

    /// Whether the charge depends on a usage quantity.
    pub fn is_metered(&self) -> bool {
        matches!(self, Self::PayAsYouGo { .. } | Self::Freemium { .. })
    }
}
