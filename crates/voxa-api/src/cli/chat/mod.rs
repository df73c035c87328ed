//! Interactive chat session for Voxa.
//!
//! Each submitted line is treated as one recognized utterance. Slash
//! commands inspect and control the running assistant. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
