use crate::{draw_visual, CaseDefinition, CaseError, DrawResult, ReelConfig, RngState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelSlot {
    pub item_id: String,
    pub amount: u32,
    pub winning: bool,
}

/// Cosmetic strip for the reveal. The stop slot always carries `winner`;
/// the fillers come from the visual draw and never feed back into it.
pub fn build_reel(
    case: &CaseDefinition,
    winner: &DrawResult,
    rng: &mut RngState,
    config: &ReelConfig,
) -> Result<Vec<ReelSlot>, CaseError> {
    let length = config.length.max(1);
    let stop = config.stop_index();
    let mut reel = Vec::with_capacity(length);
    for index in 0..length {
        if index == stop {
            reel.push(ReelSlot {
                item_id: winner.item_id.clone(),
                amount: winner.amount,
                winning: true,
            });
            continue;
        }
        let filler = draw_visual(case, rng)?;
        reel.push(ReelSlot {
            item_id: filler.item_id,
            amount: filler.amount,
            winning: false,
        });
    }
    Ok(reel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AmountRange, ItemEntry};

    fn case() -> CaseDefinition {
        CaseDefinition {
            id: "gold".to_string(),
            name: "Gold".to_string(),
            price: 100,
            required_level: 1,
            items: vec![
                ItemEntry {
                    item_id: "a".to_string(),
                    weight: 90,
                    amount: AmountRange::single(1),
                },
                ItemEntry {
                    item_id: "b".to_string(),
                    weight: 10,
                    amount: AmountRange { min: 1, max: 3 },
                },
            ],
            description: None,
        }
    }

    fn winner(item_id: &str, amount: u32) -> DrawResult {
        DrawResult {
            case_id: "gold".to_string(),
            item_id: item_id.to_string(),
            amount,
            label: item_id.to_string(),
            sell_value: 0,
        }
    }

    #[test]
    fn winner_sits_at_stop_slot() {
        let mut rng = RngState::from_seed(3);
        let reel = build_reel(&case(), &winner("b", 3), &mut rng, &ReelConfig::default())
            .expect("reel");
        assert_eq!(reel.len(), 35);
        assert_eq!(reel.iter().filter(|slot| slot.winning).count(), 1);
        assert_eq!(reel[20].item_id, "b");
        assert_eq!(reel[20].amount, 3);
        assert!(reel[20].winning);
    }

    #[test]
    fn winner_outside_table_is_still_surfaced() {
        let mut rng = RngState::from_seed(9);
        let config = ReelConfig {
            length: 5,
            winning_index: 99,
        };
        let reel = build_reel(&case(), &winner("jackpot", 50), &mut rng, &config).expect("reel");
        assert_eq!(reel.len(), 5);
        assert_eq!(reel[4].item_id, "jackpot");
        assert!(reel[..4].iter().all(|slot| !slot.winning && slot.item_id != "jackpot"));
    }

    #[test]
    fn fillers_do_not_depend_on_winner() {
        let config = ReelConfig::default();
        let mut first = RngState::from_seed(11);
        let mut second = RngState::from_seed(11);
        let a = build_reel(&case(), &winner("a", 1), &mut first, &config).expect("reel");
        let b = build_reel(&case(), &winner("b", 2), &mut second, &config).expect("reel");
        for (index, (left, right)) in a.iter().zip(b.iter()).enumerate() {
            if index != config.stop_index() {
                assert_eq!(left, right);
            }
        }
    }
}
