use anyhow::{bail, Context};
use caseroll_core::{CaseDefinition, Catalog, EngineConfig, Inbound, PlayerSnapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk form of a catalog push: the same shape the host sends as
/// `caseCatalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    pub cases: Vec<CaseDefinition>,
    #[serde(default)]
    pub player_snapshot: PlayerSnapshot,
}

impl CatalogFile {
    pub fn into_inbound(self) -> Inbound {
        Inbound::CaseCatalog {
            cases: self.cases,
            player_snapshot: self.player_snapshot,
        }
    }
}

pub fn load_catalog_file(path: &Path) -> anyhow::Result<CatalogFile> {
    let file: CatalogFile = load_json(path)?;
    if file.cases.is_empty() {
        bail!("{} defines no cases", path.display());
    }
    Ok(file)
}

/// Loads a catalog, keeping only the cases that validate.
pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let file = load_catalog_file(path)?;
    let total = file.cases.len();
    let catalog = Catalog::from_push(file.cases);
    if catalog.len() < total {
        tracing::warn!(
            path = %path.display(),
            dropped = total - catalog.len(),
            "catalog contained invalid cases"
        );
    }
    Ok(catalog)
}

/// Missing file means defaults; a present but malformed file is an error.
pub fn load_engine_config(path: &Path) -> anyhow::Result<EngineConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no engine config, using defaults");
        return Ok(EngineConfig::default());
    }
    let config: EngineConfig = load_json(path)?;
    if config.progression.base_xp == 0 {
        bail!("{}: progression.base_xp must be positive", path.display());
    }
    if !(config.progression.growth.is_finite() && config.progression.growth > 0.0) {
        bail!("{}: progression.growth must be positive", path.display());
    }
    Ok(config)
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
