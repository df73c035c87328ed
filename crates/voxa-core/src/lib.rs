//! Interpretation engine and background services for Voxa.
//!
//! This crate turns recognized utterances into skill outputs: it normalizes
//! text, scores it against each skill's patterns, picks a winner, and keeps
//! track of follow-up exchanges. It also owns the auto-skill scheduler and
//! the countdown timer registry, and defines the "ports" (device and service
//! traits) that the infrastructure layer implements. It depends only on
//! `voxa-types` -- never on `voxa-infra` or any IO crate.

pub mod auto;
pub mod eval;
pub mod port;
pub mod recognizer;
pub mod skill;
pub mod skills;
pub mod text;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;
