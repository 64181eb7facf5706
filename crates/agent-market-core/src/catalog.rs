use serde::{Deserialize, Serialize};

use crate::pricing::{BillingModel, PricingDescriptor};

/// Display-only performance figures. Free-form strings, no numeric meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    pub speed: String,
    pub accuracy: String,
    pub uptime: String,
}

/// One listed agent and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub description: String,
    pub pricing_details: PricingDescriptor,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
    #[serde(default)]
    pub privacy: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub performance: Performance,
    #[serde(default)]
    pub free_tier: String,
    #[serde(default)]
    pub logo: String,
}

impl AgentRecord {
    pub fn billing_model(&self) -> BillingModel {
        self.pricing_details.model()
    }

    /// The short price label shown on a listing card ("Freemium", "Free", ...).
    pub fn price_label(&self) -> &'static str {
        self.billing_model().label()
    }

    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.iter().any(|c| c == tag)
    }
}

impl AsRef<AgentRecord> for AgentRecord {
    fn as_ref(&self) -> &AgentRecord {
        self
    }
}

/// Find a record by id.
pub fn find(records: &[AgentRecord], id: u32) -> Option<&AgentRecord> {
    records.iter().find(|r| r.id == id)
}

/// Return the first id that occurs more than once, if any.
pub fn duplicate_id(records: &[AgentRecord]) -> Option<u32> {
    let mut seen = std::collections::HashSet::new();
    records.iter().map(|r| r.id).find(|id| !seen.insert(*id))
}

/// Every distinct capability across the catalog, in first-seen order.
pub fn all_capabilities(records: &[AgentRecord]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for cap in records.iter().flat_map(|r| r.capabilities.iter()) {
        if !out.contains(&cap.as_str()) {
            out.push(cap);
        }
    }
    out
}
