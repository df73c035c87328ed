//! Ports: traits for the devices and services the engine talks to.
//!
//! Implementations live in `voxa-infra`; tests use in-memory doubles.

pub mod alarm;
pub mod settings;
pub mod speech;
pub mod telephony;
pub mod weather;

pub use alarm::AlarmDevice;
pub use settings::{MemorySettings, SettingsStore};
pub use speech::{SpeechInput, SpeechOutput};
pub use telephony::{ContactBook, Dialer};
pub use weather::{BoxWeatherProvider, WeatherProvider, WeatherProviderDyn};
