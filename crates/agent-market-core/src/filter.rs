use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::AgentRecord;
use crate::pricing::BillingModel;

/// Price-tier selector: everything, or exactly one billing model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PriceTier {
    #[default]
    All,
    Only(BillingModel),
}

impl PriceTier {
    pub fn matches(self, model: BillingModel) -> bool {
        match self {
            Self::All => true,
            Self::Only(m) => m == model,
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(m) => f.write_str(m.label()),
        }
    }
}

impl FromStr for PriceTier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<BillingModel>().map(Self::Only)
    }
}

impl TryFrom<String> for PriceTier {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PriceTier> for String {
    fn from(t: PriceTier) -> String {
        t.to_string()
    }
}

/// Structured part of a catalog query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub price_tier: PriceTier,
    /// Every tag listed here must be on the record.
    pub capabilities: Vec<String>,
    pub verified_only: bool,
}

impl FilterCriteria {
    pub fn with_tier(mut self, tier: PriceTier) -> Self {
        self.price_tier = tier;
        self
    }

    pub fn require(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn verified_only(mut self, on: bool) -> Self {
        self.verified_only = on;
        self
    }
}

fn matches_text(record: &AgentRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.name.to_lowercase().contains(needle)
        || record.description.to_lowercase().contains(needle)
        || record.category.to_lowercase().contains(needle)
}

/// Whether one record passes the free-text query and every criterion.
pub fn matches(record: &AgentRecord, query: &str, criteria: &FilterCriteria) -> bool {
    let needle = query.to_lowercase();
    matches_lowered(record, &needle, criteria)
}

fn matches_lowered(record: &AgentRecord, needle: &str, criteria: &FilterCriteria) -> bool {
    matches_text(record, needle)
        && criteria.price_tier.matches(record.billing_model())
        && criteria.capabilities.iter().all(|c| record.has_capability(c))
        && (!criteria.verified_only || record.verified)
}

/// Records matching `query` and `criteria`, in input order.
pub fn filter<'a>(
    records: &'a [AgentRecord],
    query: &str,
    criteria: &FilterCriteria,
) -> Vec<&'a AgentRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| matches_lowered(r, &needle, criteria))
        .collect()
}
