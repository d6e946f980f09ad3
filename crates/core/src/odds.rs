use crate::{CaseDefinition, CaseError, ItemEntry, RngState};
use serde::{Deserialize, Serialize};

/// Display-only rarity ladder derived from the rounded drop percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RarityBand {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl RarityBand {
    pub fn classify(percentage: f64) -> Self {
        if percentage < 1.0 {
            Self::Legendary
        } else if percentage < 5.0 {
            Self::Epic
        } else if percentage < 15.0 {
            Self::Rare
        } else if percentage < 30.0 {
            Self::Uncommon
        } else {
            Self::Common
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOdds {
    pub item_id: String,
    pub weight: u32,
    pub percentage: f64,
    pub display_percentage: f64,
    pub rarity: RarityBand,
    pub amount_label: String,
}

impl ItemOdds {
    /// Width of the chance bar in the preview, in percent.
    pub fn bar_fill(&self) -> f64 {
        (self.display_percentage * 2.0).min(100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualDraw {
    pub item_id: String,
    pub amount: u32,
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Preview odds, lowest weight first.
pub fn compute_odds(case: &CaseDefinition) -> Result<Vec<ItemOdds>, CaseError> {
    case.validate()?;
    let total = case.total_weight() as f64;
    let mut odds: Vec<ItemOdds> = case
        .items
        .iter()
        .map(|item| {
            let percentage = 100.0 * item.weight as f64 / total;
            let display_percentage = round_one_decimal(percentage);
            ItemOdds {
                item_id: item.item_id.clone(),
                weight: item.weight,
                percentage,
                display_percentage,
                rarity: RarityBand::classify(display_percentage),
                amount_label: item.amount.label(),
            }
        })
        .collect();
    odds.sort_by_key(|entry| entry.weight);
    Ok(odds)
}

/// Picks the first entry whose cumulative weight reaches `roll`.
pub fn select_weighted(entries: &[ItemEntry], roll: f64) -> Option<&ItemEntry> {
    let mut cumulative = 0.0;
    for entry in entries {
        cumulative += entry.weight as f64;
        if cumulative >= roll {
            return Some(entry);
        }
    }
    None
}

/// Cosmetic draw for reel fillers. Never an authoritative outcome.
pub fn draw_visual(case: &CaseDefinition, rng: &mut RngState) -> Result<VisualDraw, CaseError> {
    case.validate()?;
    let roll = rng.next_unit() * case.total_weight() as f64;
    let draw = match select_weighted(&case.items, roll) {
        Some(entry) => VisualDraw {
            item_id: entry.item_id.clone(),
            amount: rng.range_inclusive(entry.amount.min, entry.amount.max),
        },
        None => {
            let first = &case.items[0];
            VisualDraw {
                item_id: first.item_id.clone(),
                amount: first.amount.min,
            }
        }
    };
    Ok(draw)
}
