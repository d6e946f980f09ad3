use crate::Phase;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaseError {
    #[error("a case is already being opened")]
    AlreadyOpening,
    #[error("case is on cooldown for {remaining_seconds}s")]
    CaseOnCooldown { remaining_seconds: u32 },
    #[error("not enough money: need {price}, have {money}")]
    InsufficientFunds { price: u64, money: u64 },
    #[error("level {required} required, player is level {level}")]
    LevelTooLow { required: u32, level: u32 },
    #[error("invalid case definition: {0}")]
    InvalidCaseDefinition(String),
    #[error("invalid level: {0}")]
    InvalidLevel(u32),
    #[error("stale response: {0}")]
    StaleResponse(String),
    #[error("remote failure: {0}")]
    RemoteFailure(String),
    #[error("unknown case: {0}")]
    UnknownCase(String),
    #[error("unknown pending item: {0}")]
    UnknownPendingItem(String),
    #[error("invalid phase: {0:?}")]
    InvalidPhase(Phase),
}

impl CaseError {
    /// Guard failures that reject a request without touching session state.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AlreadyOpening
                | Self::CaseOnCooldown { .. }
                | Self::InsufficientFunds { .. }
                | Self::LevelTooLow { .. }
                | Self::UnknownCase(_)
        )
    }
}
