use crate::filter::{FilterCriteria, PriceTier};
use crate::pricing::BillingModel;

/// Curated starting points for common use cases.
/// Each one fills the search box and filters in a single step.
pub struct UseCaseTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub query: &'static str,
    pub tier: PriceTier,
    pub capabilities: &'static [&'static str],
}

impl UseCaseTemplate {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            price_tier: self.tier,
            capabilities: self.capabilities.iter().map(|c| c.to_string()).collect(),
            verified_only: false,
        }
    }
}

pub const TEMPLATES: &[UseCaseTemplate] = &[
    UseCaseTemplate {
        key: "ecommerce",
        name: "E-commerce",
        query: "e-commerce",
        tier: PriceTier::All,
        capabilities: &["Batch Processing"],
    },
    UseCaseTemplate {
        key: "content",
        name: "Content Creation",
        query: "content",
        tier: PriceTier::All,
        capabilities: &["SEO Optimization"],
    },
    UseCaseTemplate {
        key: "research",
        name: "Academic Research",
        query: "research",
        tier: PriceTier::Only(BillingModel::Free),
        capabilities: &[],
    },
];

/// Look up a template by key or display name, case-insensitively.
pub fn find(key: &str) -> Option<&'static UseCaseTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.key.eq_ignore_ascii_case(key) || t.name.eq_ignore_ascii_case(key))
}
