use serde::Deserialize;
use tracing::info;

use crate::catalog::{self, AgentRecord};
use crate::error::{MarketError, Result};
use crate::store::AgentRepository;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    agent: Vec<AgentRecord>,
}

/// Parse a catalog from TOML. Rejects duplicate ids.
pub fn parse_catalog(toml_str: &str) -> Result<Vec<AgentRecord>> {
    let cf: CatalogFile =
        toml::from_str(toml_str).map_err(|e| MarketError::Io(format!("bad agents.toml: {e}")))?;
    if let Some(id) = catalog::duplicate_id(&cf.agent) {
        return Err(MarketError::Validation(format!(
            "duplicate agent id {id} in agents.toml"
        )));
    }
    Ok(cf.agent)
}

/// Load a catalog from a TOML file on disk.
pub fn load_catalog(path: &std::path::Path) -> Result<Vec<AgentRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| MarketError::Io(e.to_string()))?;
    parse_catalog(&content)
}

/// Load the bundled agents.toml from the data/ directory.
pub fn load_bundled_catalog() -> Result<Vec<AgentRecord>> {
    let toml_str = include_str!("../../../data/agents.toml");
    parse_catalog(toml_str)
}

/// Clear the store and insert `records`. Returns how many were inserted.
pub fn seed_with(repo: &dyn AgentRepository, records: Vec<AgentRecord>) -> Result<usize> {
    if let Some(id) = catalog::duplicate_id(&records) {
        return Err(MarketError::Validation(format!("duplicate agent id {id}")));
    }
    let count = records.len();
    repo.replace_all(records)?;
    info!(count, "catalog seeded");
    Ok(count)
}

/// Replace the store's contents with the bundled catalog.
pub fn seed(repo: &dyn AgentRepository) -> Result<usize> {
    seed_with(repo, load_bundled_catalog()?)
}
