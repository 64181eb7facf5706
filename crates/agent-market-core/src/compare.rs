use serde::Serialize;

use crate::catalog::AgentRecord;

/// Separator for list-valued attributes in a comparison cell.
pub const LIST_SEPARATOR: &str = ", ";

/// A row of the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    PriceModel,
    FreeTier,
    Speed,
    Accuracy,
    Uptime,
    Privacy,
    Capabilities,
    Integrations,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::PriceModel,
        Attribute::FreeTier,
        Attribute::Speed,
        Attribute::Accuracy,
        Attribute::Uptime,
        Attribute::Privacy,
        Attribute::Capabilities,
        Attribute::Integrations,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::PriceModel => "Price Model",
            Self::FreeTier => "Free Tier",
            Self::Speed => "Speed",
            Self::Accuracy => "Accuracy",
            Self::Uptime => "Uptime",
            Self::Privacy => "Privacy Policy",
            Self::Capabilities => "Capabilities",
            Self::Integrations => "Integrations",
        }
    }

    /// Stringified value of this attribute for one record.
    pub fn extract(self, record: &AgentRecord) -> String {
        match self {
            Self::PriceModel => record.price_label().to_string(),
            Self::FreeTier => record.free_tier.clone(),
            Self::Speed => record.performance.speed.clone(),
            Self::Accuracy => record.performance.accuracy.clone(),
            Self::Uptime => record.performance.uptime.clone(),
            Self::Privacy => record.privacy.clone(),
            Self::Capabilities => record.capabilities.join(LIST_SEPARATOR),
            Self::Integrations => record.integrations.join(LIST_SEPARATOR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub attribute: Attribute,
    pub label: &'static str,
    /// One cell per compared record, in column order.
    pub cells: Vec<String>,
}

/// Attribute-by-record table. Columns follow the order records were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonTable {
    pub columns: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

/// Project `records` onto `attributes`. Meant for two or more records.
pub fn compare<R: AsRef<AgentRecord>>(records: &[R], attributes: &[Attribute]) -> ComparisonTable {
    let columns = records.iter().map(|r| r.as_ref().name.clone()).collect();
    let rows = attributes
        .iter()
        .map(|&attribute| ComparisonRow {
            attribute,
            label: attribute.label(),
            cells: records.iter().map(|r| attribute.extract(r.as_ref())).collect(),
        })
        .collect();
    ComparisonTable { columns, rows }
}
