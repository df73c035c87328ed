//! Shared domain types for Voxa.
//!
//! This crate contains the types passed between the interpretation engine,
//! its background schedulers, and the adapters around them: scores, skill
//! outputs, the interaction log, speech events, timers, contacts, weather
//! reports, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod contact;
pub mod error;
pub mod interaction;
pub mod locale;
pub mod output;
pub mod score;
pub mod skill;
pub mod speech;
pub mod timer;
pub mod weather;
