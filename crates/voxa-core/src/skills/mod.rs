//! Built-in skills and the factory list that registers them.

pub mod calculator;
pub mod current_time;
pub mod face_tracker;
pub mod telephone;
pub mod timer;
pub mod weather;
pub mod yes_no;

use std::sync::Arc;

use voxa_types::config::AssistantConfig;

use crate::port::{AlarmDevice, BoxWeatherProvider, ContactBook, Dialer};
use crate::skill::SkillInfo;
use crate::timer::TimerRegistry;

pub use calculator::CalculatorInfo;
pub use current_time::CurrentTimeInfo;
pub use face_tracker::FaceTrackerInfo;
pub use telephone::TelephoneInfo;
pub use timer::TimerInfo;
pub use weather::WeatherInfo;
pub use yes_no::YesNoSkill;

/// Devices and services the built-in skills need.
pub struct SkillDeps {
    pub timers: Arc<TimerRegistry>,
    pub alarm: Arc<dyn AlarmDevice>,
    pub contacts: Arc<dyn ContactBook>,
    pub dialer: Arc<dyn Dialer>,
    /// `None` leaves the weather skill registered but unavailable.
    pub weather: Option<BoxWeatherProvider>,
    pub config: AssistantConfig,
}

/// Every built-in skill factory, in registration (tie-break) order.
pub fn builtin(deps: &SkillDeps) -> Vec<Arc<dyn SkillInfo>> {
    vec![
        Arc::new(FaceTrackerInfo),
        Arc::new(TelephoneInfo {
            contacts: Arc::clone(&deps.contacts),
            dialer: Arc::clone(&deps.dialer),
            config: deps.config.telephone.clone(),
        }),
        Arc::new(TimerInfo {
            registry: Arc::clone(&deps.timers),
            alarm: Arc::clone(&deps.alarm),
            config: deps.config.timer.clone(),
        }),
        Arc::new(CalculatorInfo),
        Arc::new(CurrentTimeInfo),
        Arc::new(WeatherInfo {
            provider: deps.weather.clone(),
            config: deps.config.weather.clone(),
        }),
    ]
}
