use crate::{CaseError, EventBus, Request};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRewardItem {
    pub id: String,
    pub item_id: String,
    pub amount: u32,
    #[serde(default)]
    pub sell_value: u64,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    Keep,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingView {
    pub item: PendingRewardItem,
    pub in_flight: Option<ResolveAction>,
}

#[derive(Debug, Clone, Default)]
pub struct RewardLedger {
    entries: Vec<PendingView>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a fresh listing; anything still listed is actionable again.
    pub fn replace(&mut self, items: Vec<PendingRewardItem>) {
        self.entries = items
            .into_iter()
            .map(|item| PendingView {
                item,
                in_flight: None,
            })
            .collect();
    }

    pub fn list(&self) -> Vec<PendingView> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_sell_value(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| entry.item.sell_value)
            .fold(0u64, u64::saturating_add)
    }

    /// Returns `Ok(false)` when the item already has a decision in flight.
    pub fn resolve(
        &mut self,
        id: &str,
        action: ResolveAction,
        bus: &mut EventBus,
    ) -> Result<bool, CaseError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.item.id == id)
            .ok_or_else(|| CaseError::UnknownPendingItem(id.to_string()))?;
        if entry.in_flight.is_some() {
            tracing::debug!(item = %id, "pending item already resolving");
            return Ok(false);
        }
        entry.in_flight = Some(action);
        bus.send(Request::ResolvePending {
            item_id: id.to_string(),
            action,
        });
        bus.send(Request::QueryPendingItems);
        Ok(true)
    }
}
