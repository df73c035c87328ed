//! Utterance evaluation: ranking candidates and driving follow-up exchanges.

pub mod engine;
pub mod ranker;

pub use engine::{Continuation, EngineResponse, InteractionEngine};
pub use ranker::SkillRanker;
