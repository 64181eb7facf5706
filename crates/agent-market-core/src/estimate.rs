use serde::Serialize;

use crate::money::Money;
use crate::pricing::PricingDescriptor;

/// Estimated charge for a usage quantity under one pricing descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostEstimate {
    pub total: Money,
    /// Units charged for, after any free allowance.
    pub billable: u64,
    pub explanation: String,
}

/// Estimate the cost of `quantity` units. Negative quantities count as zero.
pub fn estimate(pricing: &PricingDescriptor, quantity: i64) -> CostEstimate {
    let quantity = u64::try_from(quantity).unwrap_or(0);

    match pricing {
        PricingDescriptor::Free => CostEstimate {
            total: Money::ZERO,
            billable: 0,
            explanation: "This agent is completely free.".to_string(),
        },

        PricingDescriptor::Subscription { price, unit } => CostEstimate {
            total: *price,
            billable: 0,
            explanation: format!("Fixed price per {unit}."),
        },

        PricingDescriptor::PayAsYouGo { price, unit } => CostEstimate {
            total: price.times(quantity),
            billable: quantity,
            explanation: format!("{} per {unit}.", price.fmt_rate()),
        },

        PricingDescriptor::Freemium {
            price,
            unit,
            free_tier_limit,
        } => {
            let limit = *free_tier_limit;
            let billable = quantity.saturating_sub(limit);
            let explanation = if limit > 0 && quantity <= limit {
                format!("Your usage is within the free tier of {limit} {unit}s.")
            } else if limit > 0 {
                format!("{limit} free {unit}s, then {} per {unit}.", price.fmt_rate())
            } else {
                format!("{} per {unit}.", price.fmt_rate())
            };
            CostEstimate {
                total: price.times(billable),
                billable,
                explanation,
            }
        }
    }
}
