//! Weather provider adapters.

pub mod client;
pub mod types;

pub use client::OpenWeatherProvider;
