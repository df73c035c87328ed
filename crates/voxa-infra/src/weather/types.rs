//! OpenWeatherMap current-weather response types.
//!
//! Only the fields the assistant reads are modelled; everything else in the
//! payload is ignored.

use serde::Deserialize;

use voxa_types::weather::WeatherReport;

#[derive(Debug, Clone, Deserialize)]
pub struct OwmResponse {
    pub name: String,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
    pub main: OwmMain,
    #[serde(default)]
    pub wind: OwmWind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwmCondition {
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwmWind {
    #[serde(default)]
    pub speed: f64,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct OwmError {
    #[serde(default)]
    pub message: String,
}

impl From<OwmResponse> for WeatherReport {
    fn from(resp: OwmResponse) -> Self {
        let condition = resp.weather.into_iter().next();
        Self {
            city: resp.name,
            description: condition
                .as_ref()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            temperature: resp.main.temp,
            temperature_min: resp.main.temp_min,
            temperature_max: resp.main.temp_max,
            wind_speed: resp.wind.speed,
            icon_url: condition
                .and_then(|c| c.icon)
                .map(|icon| format!("https://openweathermap.org/img/wn/{icon}@2x.png")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_into_report() {
        let json = r#"{
            "coord": {"lon": 37.62, "lat": 55.75},
            "weather": [{"id": 800, "main": "Clear", "description": "ясно", "icon": "01d"}],
            "main": {"temp": 21.4, "feels_like": 20.9, "temp_min": 19.0, "temp_max": 23.1, "pressure": 1012},
            "wind": {"speed": 3.6, "deg": 200},
            "name": "Москва",
            "cod": 200
        }"#;
        let resp: OwmResponse = serde_json::from_str(json).unwrap();
        let report = WeatherReport::from(resp);
        assert_eq!(report.city, "Москва");
        assert_eq!(report.description, "ясно");
        assert_eq!(report.temperature_max, 23.1);
        assert_eq!(report.wind_speed, 3.6);
        assert_eq!(
            report.icon_url.as_deref(),
            Some("https://openweathermap.org/img/wn/01d@2x.png")
        );
    }

    #[test]
    fn test_missing_conditions_and_wind() {
        let json = r#"{"name": "Тверь", "main": {"temp": 1.0, "temp_min": 0.0, "temp_max": 2.0}}"#;
        let report = WeatherReport::from(serde_json::from_str::<OwmResponse>(json).unwrap());
        assert!(report.description.is_empty());
        assert_eq!(report.wind_speed, 0.0);
        assert!(report.icon_url.is_none());
    }

    #[test]
    fn test_error_body() {
        let err: OwmError = serde_json::from_str(r#"{"cod": "404", "message": "city not found"}"#).unwrap();
        assert_eq!(err.message, "city not found");
    }
}
