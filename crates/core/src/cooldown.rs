use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CooldownScope {
    Global,
    Case(String),
}

impl CooldownScope {
    pub fn covers(&self, case_id: &str) -> bool {
        match self {
            Self::Global => true,
            Self::Case(id) => id == case_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownEntry {
    pub scope: CooldownScope,
    pub remaining_seconds: u32,
}

/// Remote cooldown push. No `case_id` means the cooldown gates every case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownStatus {
    pub on_cooldown: bool,
    #[serde(default)]
    pub remaining_seconds: u32,
    #[serde(default)]
    pub case_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CooldownTransition {
    Started(CooldownEntry),
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    entry: Option<CooldownEntry>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the gating state and reports the edge, if the status flipped.
    pub fn apply_status(&mut self, status: CooldownStatus) -> Option<CooldownTransition> {
        let was_gated = self.entry.is_some();
        self.entry = if status.on_cooldown {
            Some(CooldownEntry {
                scope: match status.case_id {
                    Some(id) => CooldownScope::Case(id),
                    None => CooldownScope::Global,
                },
                remaining_seconds: status.remaining_seconds,
            })
        } else {
            None
        };
        match (was_gated, &self.entry) {
            (false, Some(entry)) => Some(CooldownTransition::Started(entry.clone())),
            (true, None) => Some(CooldownTransition::Expired),
            _ => None,
        }
    }

    pub fn gate(&self, case_id: &str) -> Option<&CooldownEntry> {
        self.entry
            .as_ref()
            .filter(|entry| entry.scope.covers(case_id))
    }

    pub fn entry(&self) -> Option<&CooldownEntry> {
        self.entry.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.entry.is_some()
    }
}
