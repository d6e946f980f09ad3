//! Case-opening client core: odds, progression, cooldown gating, pending rewards
//! and the session state machine. Keep this crate free of IO and platform concerns.

pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod odds;
pub mod progression;
pub mod reel;
pub mod rng;
pub mod session;

pub use catalog::*;
pub use config::*;
pub use cooldown::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use ledger::*;
pub use odds::*;
pub use progression::*;
pub use reel::*;
pub use rng::*;
pub use session::*;
