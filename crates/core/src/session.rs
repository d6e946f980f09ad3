use crate::{
    build_reel, format_item_name, CaseDefinition, CaseError, CooldownTracker, DrawResultPayload,
    Event, EventBus, LevelData, PlayerSnapshot, ReelConfig, ReelSlot, Request, RequestToken,
    RngState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    AwaitingResult,
    Revealing,
    AwaitingChoice,
    Finalizing,
}

/// The authoritative outcome of one open request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub case_id: String,
    pub item_id: String,
    pub amount: u32,
    pub label: String,
    pub sell_value: u64,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    pub active_case: CaseDefinition,
    pub pending_draw: Option<DrawResult>,
    pub is_collecting: bool,
    pub token: RequestToken,
    next_snapshot: Option<PlayerSnapshot>,
    level_data: Option<LevelData>,
}

impl SessionState {
    pub fn active_case_id(&self) -> &str {
        &self.active_case.id
    }
}

/// Owns the single live session; `None` is the idle phase.
#[derive(Debug, Default)]
pub struct SessionMachine {
    session: Option<SessionState>,
    last_token: u64,
    stale_responses: u64,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.session
            .as_ref()
            .map_or(Phase::Idle, |session| session.phase)
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn stale_responses(&self) -> u64 {
        self.stale_responses
    }

    pub fn request_open(
        &mut self,
        case: &CaseDefinition,
        player: &PlayerSnapshot,
        cooldown: &CooldownTracker,
        bus: &mut EventBus,
    ) -> Result<RequestToken, CaseError> {
        if self.session.is_some() {
            return Err(CaseError::AlreadyOpening);
        }
        if let Some(entry) = cooldown.gate(&case.id) {
            bus.push(Event::CooldownNotice {
                case_id: case.id.clone(),
                remaining_seconds: entry.remaining_seconds,
            });
            return Err(CaseError::CaseOnCooldown {
                remaining_seconds: entry.remaining_seconds,
            });
        }
        if player.money < case.price {
            return Err(CaseError::InsufficientFunds {
                price: case.price,
                money: player.money,
            });
        }
        if player.level < case.required_level {
            return Err(CaseError::LevelTooLow {
                required: case.required_level,
                level: player.level,
            });
        }

        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.session = Some(SessionState {
            phase: Phase::AwaitingResult,
            active_case: case.clone(),
            pending_draw: None,
            is_collecting: false,
            token,
            next_snapshot: None,
            level_data: None,
        });
        tracing::info!(case_id = %case.id, token = token.0, "opening case");
        bus.send(Request::RequestOpen {
            case_id: case.id.clone(),
            token,
        });
        bus.push(Event::OpenRequested {
            case_id: case.id.clone(),
            token,
        });
        Ok(token)
    }

    pub fn on_draw_result(
        &mut self,
        payload: DrawResultPayload,
        rng: &mut RngState,
        reel_config: &ReelConfig,
        bus: &mut EventBus,
    ) -> Result<(), CaseError> {
        let expected = self
            .session
            .as_ref()
            .filter(|session| session.phase == Phase::AwaitingResult)
            .map(|session| (session.token, session.active_case.id.clone()));
        let Some((token, case_id)) = expected else {
            return Err(self.stale(format!("drawResult during {:?}", self.phase())));
        };
        if let Some(received) = payload.token.filter(|received| *received != token) {
            return Err(self.stale(format!(
                "drawResult token {} does not match {}",
                received.0, token.0
            )));
        }
        if let Some(received) = payload.case_id.as_deref().filter(|id| *id != case_id) {
            return Err(self.stale(format!(
                "drawResult for {received} while opening {case_id}"
            )));
        }

        if !payload.success {
            let reason = payload
                .error
                .unwrap_or_else(|| "case could not be opened".to_string());
            self.session = None;
            tracing::info!(case_id = %case_id, reason = %reason, "open failed");
            bus.push(Event::OpenFailed {
                case_id,
                reason: reason.clone(),
            });
            return Err(CaseError::RemoteFailure(reason));
        }

        let Some(session) = self.session.as_mut() else {
            return Err(CaseError::InvalidPhase(Phase::Idle));
        };
        match session.active_case.entry(&payload.item_id) {
            Some(entry) if !entry.amount.contains(payload.amount) => {
                tracing::warn!(
                    item = %payload.item_id,
                    amount = payload.amount,
                    "authority amount outside table range"
                );
            }
            None => {
                tracing::warn!(item = %payload.item_id, "authority item not in case table");
            }
            Some(_) => {}
        }
        let label = payload
            .item_label
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| format_item_name(&payload.item_id));
        let draw = DrawResult {
            case_id: case_id.clone(),
            item_id: payload.item_id,
            amount: payload.amount,
            label,
            sell_value: payload.sell_value,
        };
        let reel = match build_reel(&session.active_case, &draw, rng, reel_config) {
            Ok(reel) => reel,
            Err(err) => {
                tracing::warn!(error = %err, "reel fillers unavailable");
                vec![ReelSlot {
                    item_id: draw.item_id.clone(),
                    amount: draw.amount,
                    winning: true,
                }]
            }
        };
        session.pending_draw = Some(draw);
        session.next_snapshot = payload.new_player_snapshot;
        session.level_data = payload.level_data;
        session.phase = Phase::Revealing;
        tracing::debug!(case_id = %case_id, "revealing");
        bus.push(Event::RevealStarted { case_id, reel });
        Ok(())
    }

    /// Rendering finished the roll.
    pub fn reveal_complete(&mut self, bus: &mut EventBus) -> Result<(), CaseError> {
        let phase = self.phase();
        let Some(session) = self
            .session
            .as_mut()
            .filter(|session| session.phase == Phase::Revealing)
        else {
            return Err(CaseError::InvalidPhase(phase));
        };
        let Some(draw) = session.pending_draw.clone() else {
            return Err(CaseError::InvalidPhase(phase));
        };
        session.phase = Phase::AwaitingChoice;
        bus.push(Event::ChoiceReady { draw });
        Ok(())
    }

    /// Idempotent while a collect is in flight: returns `Ok(false)` and sends nothing.
    pub fn collect(&mut self, bus: &mut EventBus) -> Result<bool, CaseError> {
        let Some(session) = self.session.as_mut() else {
            return Err(CaseError::InvalidPhase(Phase::Idle));
        };
        if session.is_collecting {
            tracing::debug!("collect already in flight");
            return Ok(false);
        }
        if session.phase != Phase::AwaitingChoice {
            return Err(CaseError::InvalidPhase(session.phase));
        }
        let Some(draw) = session.pending_draw.as_ref() else {
            return Err(CaseError::InvalidPhase(session.phase));
        };
        bus.send(Request::CollectReward {
            case_id: draw.case_id.clone(),
            item_id: draw.item_id.clone(),
            amount: draw.amount,
            sell_value: draw.sell_value,
            item_label: draw.label.clone(),
            token: session.token,
        });
        bus.push(Event::CollectStarted {
            case_id: draw.case_id.clone(),
            item_id: draw.item_id.clone(),
            amount: draw.amount,
        });
        session.is_collecting = true;
        session.phase = Phase::Finalizing;
        Ok(true)
    }

    /// Closes the session on the authority's acknowledgement and returns the
    /// snapshot to install.
    pub fn acknowledge_collect(
        &mut self,
        ack: Option<PlayerSnapshot>,
        current: &PlayerSnapshot,
        bus: &mut EventBus,
    ) -> Result<PlayerSnapshot, CaseError> {
        if self.phase() != Phase::Finalizing {
            return Err(self.stale(format!("collect ack during {:?}", self.phase())));
        }
        let Some(session) = self.session.take() else {
            return Err(CaseError::InvalidPhase(Phase::Idle));
        };
        let snapshot = ack.or(session.next_snapshot).unwrap_or(*current);
        let level_up = match session.level_data {
            Some(data) => (data.new_level > data.old_level).then_some(data),
            None => (snapshot.level > current.level).then_some(LevelData {
                old_level: current.level,
                new_level: snapshot.level,
            }),
        };
        if let Some(data) = level_up {
            tracing::info!(old = data.old_level, new = data.new_level, "level up");
            bus.push(Event::LevelUp {
                old_level: data.old_level,
                new_level: data.new_level,
            });
        }
        tracing::info!(case_id = %session.active_case.id, "session finished");
        bus.push(Event::SessionFinished {
            case_id: session.active_case.id,
        });
        Ok(snapshot)
    }

    /// Safe in any phase. Responses to requests sent before the reset become stale.
    pub fn reset(&mut self, reason: &str, bus: &mut EventBus) -> bool {
        let was_active = self.session.take().is_some();
        tracing::info!(reason, was_active, "session reset");
        bus.push(Event::SessionReset {
            reason: reason.to_string(),
            was_active,
        });
        was_active
    }

    fn stale(&mut self, detail: String) -> CaseError {
        self.stale_responses += 1;
        tracing::debug!(detail = %detail, "dropping stale response");
        CaseError::StaleResponse(detail)
    }
}
