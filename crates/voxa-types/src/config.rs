//! Assistant configuration types.
//!
//! `AssistantConfig` represents the top-level `config.toml` that controls
//! locale, matching floors, timer and scheduler cadence, fuzzy lookup
//! thresholds, the weather service, and the contact list.

use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::locale::Locale;

/// Top-level configuration for the assistant.
///
/// Loaded from `~/.voxa/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Language for replies and recognized phrases.
    #[serde(default)]
    pub locale: Locale,

    /// Skill ids that are registered but not enabled.
    #[serde(default)]
    pub disabled_skills: Vec<String>,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub auto: AutoConfig,

    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub telephone: TelephoneConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    /// Address book used by the telephone skill.
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// Candidate filtering for the skill ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Candidates scoring below this floor are discarded. `0.0` disables the floor.
    #[serde(default)]
    pub min_score: f32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { min_score: 0.0 }
    }
}

/// Background (auto) skill cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoConfig {
    /// Refresh interval for auto skills that do not declare their own.
    #[serde(default = "default_auto_interval_secs")]
    pub default_interval_secs: u64,
}

fn default_auto_interval_secs() -> u64 {
    60
}

impl Default for AutoConfig {
    fn default() -> Self {
        Self {
            default_interval_secs: default_auto_interval_secs(),
        }
    }
}

/// Countdown timer behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Countdown tick granularity in milliseconds.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    /// Name lookups accept a timer only when its name distance is below this.
    #[serde(default = "default_name_threshold")]
    pub name_threshold: i32,

    /// The last N seconds of a countdown are spoken aloud.
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u64,

    /// Remove a timer as soon as it expires instead of ringing until dismissed.
    #[serde(default)]
    pub dismiss_on_expiry: bool,
}

fn default_tick_millis() -> u64 {
    100
}

fn default_name_threshold() -> i32 {
    1
}

fn default_countdown_seconds() -> u64 {
    5
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
            name_threshold: default_name_threshold(),
            countdown_seconds: default_countdown_seconds(),
            dismiss_on_expiry: false,
        }
    }
}

/// Contact lookup thresholds for the telephone skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephoneConfig {
    /// Contacts whose name distance is not below this are ignored.
    #[serde(default = "default_contact_threshold")]
    pub contact_threshold: i32,

    /// A single-number contact below this distance is called without a listing,
    /// provided the runner-up is clearly worse.
    #[serde(default = "default_direct_call_threshold")]
    pub direct_call_threshold: i32,

    /// Maximum contacts offered in a disambiguation listing.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

fn default_contact_threshold() -> i32 {
    1
}

fn default_direct_call_threshold() -> i32 {
    -2
}

fn default_max_candidates() -> usize {
    5
}

impl Default for TelephoneConfig {
    fn default() -> Self {
        Self {
            contact_threshold: default_contact_threshold(),
            direct_call_threshold: default_direct_call_threshold(),
            max_candidates: default_max_candidates(),
        }
    }
}

/// Weather service access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. Falls back to the `OPENWEATHER_API_KEY` env var.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// City used when an utterance names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_city: Option<String>,

    /// Background refresh interval of the weather auto skill.
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,

    /// Reports younger than this are served from cache.
    #[serde(default = "default_cache_minutes")]
    pub cache_minutes: u64,

    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

fn default_refresh_minutes() -> u64 {
    30
}

fn default_cache_minutes() -> u64 {
    10
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: None,
            refresh_minutes: default_refresh_minutes(),
            cache_minutes: default_cache_minutes(),
            base_url: default_weather_base_url(),
        }
    }
}
