//! OpenWeatherProvider -- concrete [`WeatherProvider`] backed by the
//! OpenWeatherMap current-weather endpoint.
//!
//! Reports are cached per `(city, locale)` for `cache_minutes`, so the
//! weather auto skill and on-demand questions share one upstream request.
//! The API key is wrapped in [`SecretString`] and never logged.

use std::time::Duration;

use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;
use tracing::debug;

use voxa_core::port::WeatherProvider;
use voxa_types::config::WeatherConfig;
use voxa_types::error::UpstreamError;
use voxa_types::locale::Locale;
use voxa_types::weather::WeatherReport;

use super::types::{OwmError, OwmResponse};

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

struct CachedReport {
    fetched_at: Instant,
    report: WeatherReport,
}

/// OpenWeatherMap weather provider with a TTL cache.
pub struct OpenWeatherProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    ttl: Duration,
    cache: DashMap<(String, Locale), CachedReport>,
}

impl OpenWeatherProvider {
    pub fn new(api_key: SecretString, config: &WeatherConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| UpstreamError::NotConfigured(format!("http client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            ttl: Duration::from_secs(config.cache_minutes * 60),
            cache: DashMap::new(),
        })
    }

    /// Build a provider when an API key is configured or present in the
    /// environment. `None` leaves the weather skill unavailable.
    pub fn from_config(config: &WeatherConfig) -> Option<Self> {
        let key = resolve_api_key(config.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())?;
        match Self::new(key, config) {
            Ok(provider) => Some(provider),
            Err(e) => {
                tracing::warn!(error = %e, "weather provider unavailable");
                None
            }
        }
    }

    fn cached(&self, key: &(String, Locale)) -> Option<WeatherReport> {
        let entry = self.cache.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            return Some(entry.report.clone());
        }
        drop(entry);
        self.cache.remove(key);
        None
    }

    fn store(&self, key: (String, Locale), report: WeatherReport) {
        self.cache.insert(
            key,
            CachedReport {
                fetched_at: Instant::now(),
                report,
            },
        );
    }

    async fn fetch(&self, city: &str, locale: Locale) -> Result<WeatherReport, UpstreamError> {
        let lang = locale.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.expose_secret()),
                ("units", "metric"),
                ("lang", lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Request(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<OwmError>()
                .await
                .map(|body| body.message)
                .unwrap_or_default();
            return Err(match status.as_u16() {
                404 => UpstreamError::NotFound(city.to_string()),
                401 => UpstreamError::NotConfigured("weather API key rejected".to_string()),
                _ => UpstreamError::Request(format!("HTTP {status}: {message}")),
            });
        }

        let body: OwmResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("failed to parse response: {e}")))?;
        Ok(body.into())
    }
}

/// Config key first, then the environment. Blank keys count as absent.
pub fn resolve_api_key(configured: Option<&str>, env: Option<String>) -> Option<SecretString> {
    configured
        .map(str::to_string)
        .or(env)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

impl WeatherProvider for OpenWeatherProvider {
    fn name(&self) -> &str {
        "openweathermap"
    }

    async fn current(&self, city: &str, locale: Locale) -> Result<WeatherReport, UpstreamError> {
        let key = (city.trim().to_lowercase(), locale);
        if let Some(report) = self.cached(&key) {
            debug!(city, "weather served from cache");
            return Ok(report);
        }

        let report = self.fetch(city, locale).await?;
        debug!(city, temperature = report.temperature, "weather fetched");
        self.store(key, report.clone());
        Ok(report)
    }
}

// No Debug derive: the struct holds the API key.

#[cfg(test)]
mod tests {
    use super::*;

    fn report(city: &str) -> WeatherReport {
        WeatherReport {
            city: city.to_string(),
            description: "пасмурно".to_string(),
            temperature: 4.0,
            temperature_min: 2.0,
            temperature_max: 6.0,
            wind_speed: 5.0,
            icon_url: None,
        }
    }

    fn provider(base_url: &str) -> OpenWeatherProvider {
        let config = WeatherConfig {
            base_url: base_url.to_string(),
            ..WeatherConfig::default()
        };
        OpenWeatherProvider::new(SecretString::from("test-key".to_string()), &config).unwrap()
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        let key = resolve_api_key(Some("from-config"), Some("from-env".to_string())).unwrap();
        assert_eq!(key.expose_secret(), "from-config");

        let key = resolve_api_key(None, Some(" from-env ".to_string())).unwrap();
        assert_eq!(key.expose_secret(), "from-env");

        assert!(resolve_api_key(Some("  "), None).is_none());
        assert!(resolve_api_key(None, None).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_within_ttl() {
        let provider = provider("http://127.0.0.1:9/weather");
        provider.store(("москва".to_string(), Locale::Ru), report("Москва"));

        tokio::time::advance(Duration::from_secs(9 * 60)).await;
        let hit = provider.current("Москва ", Locale::Ru).await.unwrap();
        assert_eq!(hit.city, "Москва");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_entry_expires() {
        let provider = provider("http://127.0.0.1:9/weather");
        let key = ("москва".to_string(), Locale::Ru);
        provider.store(key.clone(), report("Москва"));

        tokio::time::advance(Duration::from_secs(11 * 60)).await;
        assert!(provider.cached(&key).is_none());
        assert!(provider.cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_is_per_locale() {
        let provider = provider("http://127.0.0.1:9/weather");
        provider.store(("moscow".to_string(), Locale::Ru), report("Москва"));
        assert!(provider.cached(&("moscow".to_string(), Locale::En)).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_request_error() {
        let provider = provider("http://127.0.0.1:9/weather");
        let err = provider.current("Москва", Locale::Ru).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Request(_)));
        assert!(!err.to_string().contains("test-key"));
    }
}
