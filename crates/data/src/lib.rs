//! File loading, wire decoding and replay scripts for the case engine.

pub mod load;
pub mod script;
pub mod wire;

pub use load::*;
pub use script::*;
pub use wire::*;
