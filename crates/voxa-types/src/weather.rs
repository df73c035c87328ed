//! Weather report returned by a weather provider.

use serde::{Deserialize, Serialize};

/// Current conditions for one place. Temperatures are in degrees Celsius,
/// wind speed in metres per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub description: String,
    pub temperature: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub wind_speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}
