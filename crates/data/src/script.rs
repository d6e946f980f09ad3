use crate::load::load_json;
use anyhow::bail;
use caseroll_core::{CaseEngine, CaseError, EventBus, Inbound, ResolveAction};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const SCRIPT_SCHEMA_VERSION: u32 = 1;

/// One scripted input: either a host message or a player action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReplayStep {
    Inbound { message: Inbound },
    Open { case_id: String },
    RevealComplete,
    Collect,
    Keep { id: String },
    Sell { id: String },
    RefreshPending,
    QueryStats,
    Close,
    Reset { reason: String },
}

impl ReplayStep {
    pub fn label(&self) -> &'static str {
        match self {
            ReplayStep::Inbound { message } => message.kind(),
            ReplayStep::Open { .. } => "open",
            ReplayStep::RevealComplete => "revealComplete",
            ReplayStep::Collect => "collect",
            ReplayStep::Keep { .. } => "keep",
            ReplayStep::Sell { .. } => "sell",
            ReplayStep::RefreshPending => "refreshPending",
            ReplayStep::QueryStats => "queryStats",
            ReplayStep::Close => "close",
            ReplayStep::Reset { .. } => "reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub version: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn new(steps: Vec<ReplayStep>) -> Self {
        Self {
            version: SCRIPT_SCHEMA_VERSION,
            seed: None,
            steps,
        }
    }
}

pub fn load_script(path: &Path) -> anyhow::Result<ReplayScript> {
    let script: ReplayScript = load_json(path)?;
    if script.version != SCRIPT_SCHEMA_VERSION {
        bail!(
            "unsupported script version {} (expected {})",
            script.version,
            SCRIPT_SCHEMA_VERSION
        );
    }
    Ok(script)
}

pub fn save_script(script: &ReplayScript, path: &Path) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(script)?;
    fs::write(path, body)?;
    Ok(())
}

/// Feeds one step into the engine. Rejections come back as the engine's
/// error; nothing here retries.
pub fn apply_step(
    engine: &mut CaseEngine,
    step: &ReplayStep,
    bus: &mut EventBus,
) -> Result<(), CaseError> {
    match step {
        ReplayStep::Inbound { message } => engine.apply(message.clone(), bus)?,
        ReplayStep::Open { case_id } => {
            engine.request_open(case_id, bus)?;
        }
        ReplayStep::RevealComplete => engine.reveal_complete(bus)?,
        ReplayStep::Collect => {
            if !engine.collect(bus)? {
                tracing::debug!("collect already in flight");
            }
        }
        ReplayStep::Keep { id } => {
            engine.resolve_pending(id, ResolveAction::Keep, bus)?;
        }
        ReplayStep::Sell { id } => {
            engine.resolve_pending(id, ResolveAction::Sell, bus)?;
        }
        ReplayStep::RefreshPending => engine.refresh_pending(bus),
        ReplayStep::QueryStats => engine.query_stats(bus),
        ReplayStep::Close => engine.close(bus),
        ReplayStep::Reset { reason } => {
            engine.reset(reason, bus);
        }
    }
    Ok(())
}
