use crate::{
    compute_odds, CaseDefinition, CaseError, Catalog, CooldownScope, CooldownTracker,
    CooldownTransition, EngineConfig, Event, EventBus, Inbound, ItemOdds, PendingView, Phase,
    PlayerSnapshot, PlayerStats, Progression, Request, RequestToken, ResolveAction, RewardLedger,
    RngState, SessionMachine, SessionState, XpProgress,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CaseAvailability {
    Available,
    Opening,
    OnCooldown { remaining_seconds: u32 },
    InsufficientFunds,
    LevelTooLow,
}

impl CaseAvailability {
    pub fn can_open(self) -> bool {
        self == Self::Available
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseCard {
    pub case_id: String,
    pub name: String,
    pub price: u64,
    pub required_level: u32,
    pub availability: CaseAvailability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasePreview {
    pub case_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: u64,
    pub item_count: usize,
    pub odds: Vec<ItemOdds>,
    pub availability: CaseAvailability,
}

/// Root of the case-opening client. Every handler takes it by `&mut`.
#[derive(Debug)]
pub struct CaseEngine {
    config: EngineConfig,
    progression: Progression,
    catalog: Catalog,
    player: PlayerSnapshot,
    stats: Option<PlayerStats>,
    cooldown: CooldownTracker,
    ledger: RewardLedger,
    session: SessionMachine,
    rng: RngState,
}

impl CaseEngine {
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => RngState::from_seed(seed),
            None => RngState::from_entropy(),
        };
        Self {
            progression: Progression::new(&config.progression),
            config,
            catalog: Catalog::default(),
            player: PlayerSnapshot::default(),
            stats: None,
            cooldown: CooldownTracker::new(),
            ledger: RewardLedger::new(),
            session: SessionMachine::new(),
            rng,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn player(&self) -> &PlayerSnapshot {
        &self.player
    }

    pub fn stats(&self) -> Option<&PlayerStats> {
        self.stats.as_ref()
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.session()
    }

    pub fn stale_responses(&self) -> u64 {
        self.session.stale_responses()
    }

    pub fn pending(&self) -> Vec<PendingView> {
        self.ledger.list()
    }

    pub fn pending_sell_value(&self) -> u64 {
        self.ledger.total_sell_value()
    }

    /// Routes one message from the remote authority. Stale responses are
    /// logged, counted and swallowed.
    pub fn apply(&mut self, inbound: Inbound, bus: &mut EventBus) -> Result<(), CaseError> {
        tracing::debug!(kind = inbound.kind(), phase = ?self.phase(), "inbound");
        let result = match inbound {
            Inbound::CaseCatalog {
                cases,
                player_snapshot,
            } => {
                self.catalog = Catalog::from_push(cases);
                self.player = player_snapshot;
                bus.push(Event::CatalogLoaded {
                    cases: self.catalog.len(),
                });
                Ok(())
            }
            Inbound::DrawResult(payload) => {
                self.session
                    .on_draw_result(payload, &mut self.rng, &self.config.reel, bus)
            }
            Inbound::CooldownStatus(status) => {
                match self.cooldown.apply_status(status) {
                    Some(CooldownTransition::Started(entry)) => {
                        bus.push(Event::CooldownStarted {
                            remaining_seconds: entry.remaining_seconds,
                            case_id: match entry.scope {
                                CooldownScope::Global => None,
                                CooldownScope::Case(id) => Some(id),
                            },
                        });
                    }
                    Some(CooldownTransition::Expired) => {
                        tracing::debug!("cooldown expired");
                        bus.push(Event::CasesAvailable);
                    }
                    None => {}
                }
                Ok(())
            }
            Inbound::PendingItems { items } => {
                self.ledger.replace(items);
                bus.push(Event::PendingItemsUpdated {
                    count: self.ledger.len(),
                });
                Ok(())
            }
            Inbound::SessionReset { reason } => {
                self.session.reset(&reason, bus);
                Ok(())
            }
            Inbound::CollectAcknowledged { player_snapshot } => self
                .session
                .acknowledge_collect(player_snapshot, &self.player, bus)
                .map(|snapshot| self.player = snapshot),
            Inbound::MoneyUpdated { money } => {
                self.player = self.player.with_money(money);
                bus.push(Event::MoneyUpdated { money });
                Ok(())
            }
            Inbound::PlayerStats(stats) => {
                self.stats = Some(stats);
                bus.push(Event::StatsUpdated);
                Ok(())
            }
        };
        match result {
            Err(CaseError::StaleResponse(_)) => Ok(()),
            other => other,
        }
    }

    pub fn request_open(
        &mut self,
        case_id: &str,
        bus: &mut EventBus,
    ) -> Result<RequestToken, CaseError> {
        if self.session.session().is_some() {
            return Err(CaseError::AlreadyOpening);
        }
        let case = self
            .catalog
            .get(case_id)
            .ok_or_else(|| CaseError::UnknownCase(case_id.to_string()))?;
        let result = self
            .session
            .request_open(case, &self.player, &self.cooldown, bus);
        if let Err(err) = &result {
            tracing::debug!(case_id, error = %err, rejection = err.is_rejection(), "open rejected");
        }
        result
    }

    pub fn reveal_complete(&mut self, bus: &mut EventBus) -> Result<(), CaseError> {
        self.session.reveal_complete(bus)
    }

    pub fn collect(&mut self, bus: &mut EventBus) -> Result<bool, CaseError> {
        self.session.collect(bus)
    }

    pub fn reset(&mut self, reason: &str, bus: &mut EventBus) -> bool {
        self.session.reset(reason, bus)
    }

    pub fn resolve_pending(
        &mut self,
        id: &str,
        action: ResolveAction,
        bus: &mut EventBus,
    ) -> Result<bool, CaseError> {
        self.ledger.resolve(id, action, bus)
    }

    pub fn refresh_pending(&self, bus: &mut EventBus) {
        bus.send(Request::QueryPendingItems);
    }

    pub fn query_stats(&self, bus: &mut EventBus) {
        bus.send(Request::QueryPlayerStats);
    }

    pub fn close(&self, bus: &mut EventBus) {
        bus.send(Request::CloseUi);
    }

    pub fn xp_threshold(&self, level: u32) -> Result<u64, CaseError> {
        self.progression.xp_threshold(level)
    }

    pub fn progress(&self) -> Result<XpProgress, CaseError> {
        self.progression.progress_ratio(&self.player)
    }

    pub fn availability(&self, case: &CaseDefinition) -> CaseAvailability {
        if self.session.session().is_some() {
            return CaseAvailability::Opening;
        }
        if let Some(entry) = self.cooldown.gate(&case.id) {
            return CaseAvailability::OnCooldown {
                remaining_seconds: entry.remaining_seconds,
            };
        }
        if self.player.money < case.price {
            return CaseAvailability::InsufficientFunds;
        }
        if self.player.level < case.required_level {
            return CaseAvailability::LevelTooLow;
        }
        CaseAvailability::Available
    }

    pub fn case_cards(&self) -> Vec<CaseCard> {
        self.catalog
            .by_required_level()
            .into_iter()
            .map(|case| CaseCard {
                case_id: case.id.clone(),
                name: case.name.clone(),
                price: case.price,
                required_level: case.required_level,
                availability: self.availability(case),
            })
            .collect()
    }

    pub fn preview(&self, case_id: &str) -> Result<CasePreview, CaseError> {
        let case = self
            .catalog
            .get(case_id)
            .ok_or_else(|| CaseError::UnknownCase(case_id.to_string()))?;
        Ok(CasePreview {
            case_id: case.id.clone(),
            name: case.name.clone(),
            description: case.description.clone(),
            price: case.price,
            item_count: case.items.len(),
            odds: compute_odds(case)?,
            availability: self.availability(case),
        })
    }
}

impl Default for CaseEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
