//! Infrastructure layer for Voxa.
//!
//! Contains implementations of the port traits defined in `voxa-core`:
//! configuration and settings files, console speech devices, a terminal
//! alarm, a logging dialer, the configured address book, and the
//! OpenWeatherMap weather provider.

pub mod alarm;
pub mod config;
pub mod settings;
pub mod speech;
pub mod telephony;
pub mod weather;
