use std::path::PathBuf;

/// Default location of `agent-market.toml` (not created).
pub fn config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("agent-market").join("agent-market.toml"))
}
