//! Current weather for a named or default city.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tracing::warn;

use voxa_types::config::WeatherConfig;
use voxa_types::error::{PatternError, UpstreamError};
use voxa_types::locale::Locale;
use voxa_types::output::Rendering;
use voxa_types::score::Specificity;
use voxa_types::skill::SkillMeta;
use voxa_types::weather::WeatherReport;

use crate::port::{BoxWeatherProvider, WeatherProvider};
use crate::recognizer::{Extraction, Pattern};
use crate::skill::{AutoRunnable, FuzzySkill, Skill, SkillContext, SkillInfo, SkillOutput};
use crate::text::numbers::russian_plural;

pub const WEATHER_ID: &str = "weather";

/// Settings key overriding the configured default city.
pub const DEFAULT_CITY_KEY: &str = "weather.default_city";

fn capitalize(city: &str) -> String {
    let mut chars = city.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn describe(report: &WeatherReport, locale: Locale) -> String {
    let temperature = report.temperature.round() as i64;
    let wind = report.wind_speed.round() as i64;
    match locale {
        Locale::Ru => format!(
            "{}: {}, {temperature} {}, ветер {wind} м/с",
            report.city,
            report.description,
            russian_plural(temperature.unsigned_abs(), "градус", "градуса", "градусов")
        ),
        Locale::En => format!(
            "{}: {}, {temperature} degrees, wind {wind} m/s",
            report.city, report.description
        ),
    }
}

pub struct WeatherSkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<Option<String>>>,
    provider: BoxWeatherProvider,
    default_city: Option<String>,
    refresh: Duration,
}

impl WeatherSkill {
    pub fn new(provider: BoxWeatherProvider, config: &WeatherConfig) -> Result<Self, PatternError> {
        let city = |extraction: &Extraction<'_>| extraction.group("city").map(capitalize);
        Ok(Self {
            meta: SkillMeta::new(WEATHER_ID, Specificity::Medium),
            patterns: vec![
                Pattern::new(
                    "какая погода",
                    r"^(?:какая\s+)?погода(?:\s+(?:сейчас|сегодня))?(?:\s+(?:в|во)\s+(?P<city>.+?))?(?:\s+(?:сейчас|сегодня))?$",
                    city,
                )?,
                Pattern::new(
                    "сколько градусов",
                    r"^(?:сколько\s+градусов|какая\s+температура)(?:\s+(?:на\s+улице|сейчас))?(?:\s+(?:в|во)\s+(?P<city>.+))?$",
                    city,
                )?,
                Pattern::new(
                    "what is the weather",
                    r"^(?:what\s+(?:is|s)\s+the\s+)?weather(?:\s+like)?(?:\s+in\s+(?P<city>.+?))?(?:\s+today)?$",
                    city,
                )?,
            ],
            provider,
            default_city: config.default_city.clone().filter(|c| !c.trim().is_empty()),
            refresh: Duration::from_secs(config.refresh_minutes.max(1) * 60),
        })
    }

    fn city_for(&self, ctx: &SkillContext, requested: Option<String>) -> Option<String> {
        requested
            .or_else(|| {
                ctx.settings
                    .get(DEFAULT_CITY_KEY)
                    .filter(|city| !city.trim().is_empty())
            })
            .or_else(|| self.default_city.clone())
    }

    async fn report(&self, ctx: &SkillContext, requested: Option<String>) -> SkillOutput {
        let Some(city) = self.city_for(ctx, requested) else {
            return SkillOutput::not_found(
                ctx.localized(
                    "Не знаю, для какого города узнать погоду",
                    "Which city should I check?",
                ),
                "",
            );
        };

        match self.provider.current(&city, ctx.locale).await {
            Ok(report) => {
                SkillOutput::new(describe(&report, ctx.locale)).with_rendering(Rendering::Weather { report })
            }
            Err(UpstreamError::NotFound(_)) => {
                let speech = match ctx.locale {
                    Locale::Ru => format!("Не нашёл город {city}"),
                    Locale::En => format!("I couldn't find {city}"),
                };
                SkillOutput::not_found(speech, city)
            }
            Err(e) => {
                warn!(provider = self.provider.name(), %city, error = %e, "weather lookup failed");
                SkillOutput::upstream_failure(
                    ctx.localized("Не удалось узнать погоду", "I couldn't get the weather"),
                    city,
                )
            }
        }
    }
}

impl FuzzySkill for WeatherSkill {
    type Input = Option<String>;

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<Option<String>>] {
        &self.patterns
    }

    async fn generate_output(&self, ctx: &SkillContext, city: Option<String>) -> SkillOutput {
        self.report(ctx, city).await
    }

    fn auto_runnable(self: Arc<Self>) -> Option<Arc<dyn AutoRunnable>> {
        Some(self)
    }
}

impl AutoRunnable for WeatherSkill {
    fn auto_update_interval(&self) -> Option<Duration> {
        Some(self.refresh)
    }

    fn auto_output<'a>(&'a self, ctx: &'a SkillContext) -> BoxFuture<'a, SkillOutput> {
        Box::pin(self.report(ctx, None))
    }
}

/// Stand-in used when no weather service is configured.
struct UnconfiguredWeather;

impl WeatherProvider for UnconfiguredWeather {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn current(&self, _city: &str, _locale: Locale) -> Result<WeatherReport, UpstreamError> {
        Err(UpstreamError::NotConfigured("no weather provider".to_string()))
    }
}

pub struct WeatherInfo {
    pub provider: Option<BoxWeatherProvider>,
    pub config: WeatherConfig,
}

impl SkillInfo for WeatherInfo {
    fn id(&self) -> &str {
        WEATHER_ID
    }

    fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Погода",
            Locale::En => "Weather",
        }
    }

    fn sentence_example(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Какая погода в Москве?",
            Locale::En => "What's the weather in London?",
        }
    }

    fn is_available(&self, _ctx: &SkillContext) -> bool {
        self.provider.is_some()
    }

    fn build(&self, _ctx: &SkillContext) -> Result<Arc<dyn Skill>, PatternError> {
        let provider = self
            .provider
            .clone()
            .unwrap_or_else(|| BoxWeatherProvider::new(UnconfiguredWeather));
        Ok(Arc::new(WeatherSkill::new(provider, &self.config)?))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use voxa_types::output::OutputStatus;

    use super::*;
    use crate::port::MemorySettings;
    use crate::testing::{test_context, test_context_with};
    use crate::text::normalize;

    #[derive(Default)]
    struct FakeWeather {
        fail: bool,
        asked: Mutex<Vec<String>>,
    }

    impl WeatherProvider for Arc<FakeWeather> {
        fn name(&self) -> &str {
            "fake"
        }

        async fn current(&self, city: &str, _locale: Locale) -> Result<WeatherReport, UpstreamError> {
            self.asked.lock().unwrap().push(city.to_string());
            if self.fail {
                return Err(UpstreamError::Request("timed out".to_string()));
            }
            Ok(WeatherReport {
                city: city.to_string(),
                description: "ясно".to_string(),
                temperature: 21.4,
                temperature_min: 18.0,
                temperature_max: 23.0,
                wind_speed: 3.2,
                icon_url: None,
            })
        }
    }

    fn skill(fake: &Arc<FakeWeather>, default_city: Option<&str>) -> Arc<dyn Skill> {
        let config = WeatherConfig {
            default_city: default_city.map(str::to_string),
            ..WeatherConfig::default()
        };
        let info = WeatherInfo {
            provider: Some(BoxWeatherProvider::new(Arc::clone(fake))),
            config,
        };
        info.build(&test_context().0).unwrap()
    }

    async fn ask(skill: Arc<dyn Skill>, ctx: Arc<SkillContext>, utterance: &str) -> SkillOutput {
        let candidate = skill.score(&normalize(utterance)).expect("weather question");
        candidate.into_output(ctx).await
    }

    #[tokio::test]
    async fn test_city_from_utterance() {
        let fake = Arc::new(FakeWeather::default());
        let output = ask(skill(&fake, Some("Москва")), test_context().0, "Какая погода в Казани?").await;

        assert_eq!(*fake.asked.lock().unwrap(), vec!["Казани"]);
        assert_eq!(output.speech, "Казани: ясно, 21 градус, ветер 3 м/с");
        assert!(matches!(output.rendering, Some(Rendering::Weather { .. })));
    }

    #[tokio::test]
    async fn test_settings_city_overrides_config() {
        let fake = Arc::new(FakeWeather::default());
        let (ctx, _) = test_context_with(MemorySettings::new().with(DEFAULT_CITY_KEY, "Самара"));

        ask(skill(&fake, Some("Москва")), ctx, "какая погода").await;
        assert_eq!(*fake.asked.lock().unwrap(), vec!["Самара"]);
    }

    #[tokio::test]
    async fn test_provider_failure_carries_city() {
        let fake = Arc::new(FakeWeather {
            fail: true,
            ..FakeWeather::default()
        });
        let output = ask(skill(&fake, Some("Москва")), test_context().0, "погода").await;

        assert_eq!(output.status, OutputStatus::UpstreamFailure);
        assert_eq!(
            output.rendering,
            Some(Rendering::Failure {
                query: "Москва".into()
            })
        );
    }

    #[tokio::test]
    async fn test_no_city_known() {
        let fake = Arc::new(FakeWeather::default());
        let output = ask(skill(&fake, None), test_context().0, "what is the weather").await;
        assert_eq!(output.status, OutputStatus::NotFound);
        assert!(fake.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auto_output_uses_default_city() {
        let fake = Arc::new(FakeWeather::default());
        let skill = skill(&fake, Some("Москва"));
        let auto = skill.as_auto_runnable().unwrap();
        assert_eq!(auto.auto_update_interval(), Some(Duration::from_secs(30 * 60)));

        let (ctx, _) = test_context();
        let output = auto.auto_output(&ctx).await;
        assert!(output.is_handled());
        assert_eq!(*fake.asked.lock().unwrap(), vec!["Москва"]);
    }

    #[test]
    fn test_unavailable_without_provider() {
        let info = WeatherInfo {
            provider: None,
            config: WeatherConfig::default(),
        };
        assert!(!info.is_available(&test_context().0));
    }
}
