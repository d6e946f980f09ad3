use crate::CaseError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

impl AmountRange {
    pub fn single(amount: u32) -> Self {
        Self {
            min: amount,
            max: amount,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min >= 1 && self.min <= self.max
    }

    pub fn contains(&self, amount: u32) -> bool {
        amount >= self.min && amount <= self.max
    }

    pub fn label(&self) -> String {
        if self.min == self.max {
            format!("{}x", self.min)
        } else {
            format!("{}-{}x", self.min, self.max)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEntry {
    pub item_id: String,
    pub weight: u32,
    pub amount: AmountRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDefinition {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub required_level: u32,
    pub items: Vec<ItemEntry>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CaseDefinition {
    pub fn total_weight(&self) -> u64 {
        self.items.iter().map(|item| item.weight as u64).sum()
    }

    pub fn validate(&self) -> Result<(), CaseError> {
        if self.items.is_empty() {
            return Err(CaseError::InvalidCaseDefinition(format!(
                "case {} has no items",
                self.id
            )));
        }
        for item in &self.items {
            if item.weight == 0 {
                return Err(CaseError::InvalidCaseDefinition(format!(
                    "item {} in case {} has zero weight",
                    item.item_id, self.id
                )));
            }
            if !item.amount.is_valid() {
                return Err(CaseError::InvalidCaseDefinition(format!(
                    "item {} in case {} has amount range {}..{}",
                    item.item_id, self.id, item.amount.min, item.amount.max
                )));
            }
        }
        Ok(())
    }

    pub fn entry(&self, item_id: &str) -> Option<&ItemEntry> {
        self.items.iter().find(|item| item.item_id == item_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    cases: Vec<CaseDefinition>,
}

impl Catalog {
    /// Builds a catalog from a remote push, dropping cases that fail validation.
    pub fn from_push(cases: Vec<CaseDefinition>) -> Self {
        let cases = cases
            .into_iter()
            .filter(|case| match case.validate() {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(case_id = %case.id, error = %err, "dropping invalid case");
                    false
                }
            })
            .collect();
        Self { cases }
    }

    pub fn get(&self, case_id: &str) -> Option<&CaseDefinition> {
        self.cases.iter().find(|case| case.id == case_id)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Display order: ascending required level, push order for ties.
    pub fn by_required_level(&self) -> Vec<&CaseDefinition> {
        let mut sorted: Vec<&CaseDefinition> = self.cases.iter().collect();
        sorted.sort_by_key(|case| case.required_level);
        sorted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub level: u32,
    pub experience: u64,
    pub money: u64,
}

impl PlayerSnapshot {
    pub fn with_money(self, money: u64) -> Self {
        Self { money, ..self }
    }
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            money: 0,
        }
    }
}

/// Row from the host's open history. Rows keep the host's snake_case columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub item_won: String,
    pub item_amount: u32,
    pub case_type: String,
    pub case_price: u64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTotals {
    pub cases_opened: u64,
    pub total_spent: u64,
    pub level: u32,
}

/// `playerStats` payload: `{player: {..}, recentHistory: [..]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player: StatsTotals,
    #[serde(default)]
    pub recent_history: Vec<HistoryRecord>,
}

/// `"gold_bar"` -> `"Gold Bar"`.
pub fn format_item_name(item_id: &str) -> String {
    item_id
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
