//! Application state wiring the engine, schedulers, and adapters together.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use voxa_core::auto::AutoSkillScheduler;
use voxa_core::eval::{InteractionEngine, SkillRanker};
use voxa_core::port::{BoxWeatherProvider, SpeechOutput};
use voxa_core::skill::{SkillContext, SkillRegistry};
use voxa_core::skills::{SkillDeps, builtin};
use voxa_core::timer::TimerRegistry;
use voxa_infra::alarm::TerminalAlarm;
use voxa_infra::config::{load_config, resolve_data_dir};
use voxa_infra::settings::TomlSettings;
use voxa_infra::telephony::{ConfigContactBook, LoggingDialer};
use voxa_infra::weather::OpenWeatherProvider;
use voxa_types::config::AssistantConfig;

/// Shared application state used by every command.
pub struct AppState {
    pub config: AssistantConfig,
    pub data_dir: PathBuf,
    pub registry: Arc<SkillRegistry>,
    pub engine: Arc<InteractionEngine>,
    pub scheduler: Arc<AutoSkillScheduler>,
    pub timers: Arc<TimerRegistry>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    /// Load configuration, register skills, and start the auto-skill scheduler.
    pub async fn init(speech: Arc<dyn SpeechOutput>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;
        let settings = TomlSettings::load(&data_dir).await;

        let ctx = Arc::new(SkillContext::new(config.locale, speech, Arc::new(settings)));
        let timers = Arc::new(TimerRegistry::new(&config.timer));

        let weather = OpenWeatherProvider::from_config(&config.weather).map(BoxWeatherProvider::new);
        if weather.is_none() {
            info!("no weather API key configured, weather skill disabled");
        }

        let deps = SkillDeps {
            timers: Arc::clone(&timers),
            alarm: Arc::new(TerminalAlarm::stderr()),
            contacts: Arc::new(ConfigContactBook::new(config.contacts.clone())),
            dialer: Arc::new(LoggingDialer::new()),
            weather,
            config: config.clone(),
        };

        let registry = Arc::new(SkillRegistry::new(builtin(&deps), Arc::clone(&ctx))?);
        registry.enable_all_except(&config.disabled_skills)?;

        let engine = Arc::new(InteractionEngine::new(
            Arc::clone(&registry),
            SkillRanker::new(config.matching.min_score),
        ));

        let scheduler = Arc::new(AutoSkillScheduler::new(
            ctx,
            Duration::from_secs(config.auto.default_interval_secs),
        ));
        let watcher = scheduler.watch(registry.subscribe());

        info!(
            data_dir = %data_dir.display(),
            locale = %config.locale,
            enabled = registry.enabled().len(),
            "assistant ready"
        );

        Ok(Self {
            config,
            data_dir,
            registry,
            engine,
            scheduler,
            timers,
            watcher: Mutex::new(Some(watcher)),
        })
    }

    /// Stop background jobs and drop every running timer.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
        let watcher = self.watcher.lock().expect("watcher lock poisoned").take();
        if let Some(watcher) = watcher {
            let _ = watcher.await;
        }
        self.timers.shutdown().await;
    }
}
