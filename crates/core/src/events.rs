use crate::{
    CaseDefinition, CooldownStatus, DrawResult, PendingRewardItem, PlayerSnapshot, PlayerStats,
    ReelSlot, ResolveAction,
};
use serde::{Deserialize, Serialize};

/// Correlates an open request with the responses that belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub old_level: u32,
    pub new_level: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResultPayload {
    pub success: bool,
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub amount: u32,
    #[serde(default)]
    pub item_label: Option<String>,
    #[serde(default)]
    pub sell_value: u64,
    #[serde(default)]
    pub new_player_snapshot: Option<PlayerSnapshot>,
    #[serde(default)]
    pub level_data: Option<LevelData>,
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub token: Option<RequestToken>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Messages pushed by the remote authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Inbound {
    CaseCatalog {
        cases: Vec<CaseDefinition>,
        player_snapshot: PlayerSnapshot,
    },
    DrawResult(DrawResultPayload),
    CooldownStatus(CooldownStatus),
    PendingItems {
        items: Vec<PendingRewardItem>,
    },
    SessionReset {
        #[serde(default)]
        reason: String,
    },
    CollectAcknowledged {
        #[serde(default)]
        player_snapshot: Option<PlayerSnapshot>,
    },
    MoneyUpdated {
        money: u64,
    },
    PlayerStats(PlayerStats),
}

impl Inbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CaseCatalog { .. } => "caseCatalog",
            Self::DrawResult(_) => "drawResult",
            Self::CooldownStatus(_) => "cooldownStatus",
            Self::PendingItems { .. } => "pendingItems",
            Self::SessionReset { .. } => "sessionReset",
            Self::CollectAcknowledged { .. } => "collectAcknowledged",
            Self::MoneyUpdated { .. } => "moneyUpdated",
            Self::PlayerStats(_) => "playerStats",
        }
    }
}

/// Fire-and-forget commands for the remote authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "name",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    RequestOpen {
        case_id: String,
        token: RequestToken,
    },
    CollectReward {
        case_id: String,
        item_id: String,
        amount: u32,
        sell_value: u64,
        item_label: String,
        token: RequestToken,
    },
    ResolvePending {
        item_id: String,
        action: ResolveAction,
    },
    QueryPendingItems,
    QueryPlayerStats,
    CloseUi,
}

/// Local notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    CatalogLoaded {
        cases: usize,
    },
    OpenRequested {
        case_id: String,
        token: RequestToken,
    },
    CooldownNotice {
        case_id: String,
        remaining_seconds: u32,
    },
    OpenFailed {
        case_id: String,
        reason: String,
    },
    RevealStarted {
        case_id: String,
        reel: Vec<ReelSlot>,
    },
    ChoiceReady {
        draw: DrawResult,
    },
    CollectStarted {
        case_id: String,
        item_id: String,
        amount: u32,
    },
    LevelUp {
        old_level: u32,
        new_level: u32,
    },
    SessionFinished {
        case_id: String,
    },
    SessionReset {
        reason: String,
        was_active: bool,
    },
    CooldownStarted {
        remaining_seconds: u32,
        case_id: Option<String>,
    },
    CasesAvailable,
    MoneyUpdated {
        money: u64,
    },
    PendingItemsUpdated {
        count: usize,
    },
    StatsUpdated,
}

#[derive(Debug, Default)]
pub struct EventBus {
    requests: Vec<Request>,
    events: Vec<Event>,
}

impl EventBus {
    pub fn send(&mut self, request: Request) {
        self.requests.push(request);
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain_requests(&mut self) -> impl Iterator<Item = Request> + '_ {
        self.requests.drain(..)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_envelope_decodes_draw_result() {
        let raw = r#"{
            "type": "drawResult",
            "data": {
                "success": true,
                "itemId": "b",
                "amount": 2,
                "itemLabel": "Bandage",
                "sellValue": 40,
                "levelData": {"oldLevel": 1, "newLevel": 2},
                "token": 3
            }
        }"#;
        let inbound: Inbound = serde_json::from_str(raw).expect("decode");
        match inbound {
            Inbound::DrawResult(payload) => {
                assert!(payload.success);
                assert_eq!(payload.item_id, "b");
                assert_eq!(payload.amount, 2);
                assert_eq!(payload.token, Some(RequestToken(3)));
                assert_eq!(
                    payload.level_data,
                    Some(LevelData {
                        old_level: 1,
                        new_level: 2
                    })
                );
                assert_eq!(payload.new_player_snapshot, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn inbound_struct_variant_fields_are_camel_case() {
        let raw = r#"{"type":"caseCatalog","data":{"cases":[],"playerSnapshot":{"level":2,"experience":10,"money":500}}}"#;
        let inbound: Inbound = serde_json::from_str(raw).expect("decode");
        assert_eq!(inbound.kind(), "caseCatalog");
        assert_eq!(
            inbound,
            Inbound::CaseCatalog {
                cases: Vec::new(),
                player_snapshot: PlayerSnapshot {
                    level: 2,
                    experience: 10,
                    money: 500
                },
            }
        );
    }

    #[test]
    fn player_stats_decode_nested_totals_and_history() {
        let raw = r#"{
            "type": "playerStats",
            "data": {
                "player": {"cases_opened": 12, "total_spent": 4300, "level": 5},
                "recentHistory": [
                    {
                        "item_won": "gold_bar",
                        "item_amount": 2,
                        "case_type": "gold",
                        "case_price": 750,
                        "created_at": "2024-03-01 12:00:00"
                    }
                ]
            }
        }"#;
        let inbound: Inbound = serde_json::from_str(raw).expect("decode");
        let Inbound::PlayerStats(stats) = inbound else {
            panic!("expected playerStats");
        };
        assert_eq!(stats.player.cases_opened, 12);
        assert_eq!(stats.player.total_spent, 4300);
        assert_eq!(stats.player.level, 5);
        assert_eq!(stats.recent_history.len(), 1);
        assert_eq!(stats.recent_history[0].item_won, "gold_bar");
        assert_eq!(stats.recent_history[0].case_price, 750);

        let empty: Inbound = serde_json::from_str(
            r#"{"type":"playerStats","data":{"player":{"cases_opened":0,"total_spent":0,"level":1}}}"#,
        )
        .expect("history defaults to empty");
        assert!(matches!(empty, Inbound::PlayerStats(stats) if stats.recent_history.is_empty()));
    }

    #[test]
    fn requests_encode_with_name_and_data() {
        let request = Request::RequestOpen {
            case_id: "gold".to_string(),
            token: RequestToken(1),
        };
        let value = serde_json::to_value(&request).expect("encode");
        assert_eq!(value["name"], "requestOpen");
        assert_eq!(value["data"]["caseId"], "gold");
        assert_eq!(value["data"]["token"], 1);
        let value = serde_json::to_value(Request::QueryPendingItems).expect("encode");
        assert_eq!(value["name"], "queryPendingItems");
    }

    #[test]
    fn bus_drains_in_order() {
        let mut bus = EventBus::default();
        bus.push(Event::CasesAvailable);
        bus.push(Event::StatsUpdated);
        bus.send(Request::QueryPlayerStats);
        let events: Vec<Event> = bus.drain().collect();
        assert_eq!(events, vec![Event::CasesAvailable, Event::StatsUpdated]);
        assert!(bus.events().is_empty());
        assert_eq!(bus.requests().len(), 1);
        assert_eq!(bus.drain_requests().count(), 1);
        assert!(bus.requests().is_empty());
    }
}
