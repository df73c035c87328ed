//! Ambient services handed to every skill.

use std::fmt;
use std::sync::Arc;

use voxa_types::locale::Locale;

use crate::port::{SettingsStore, SpeechOutput};

/// Locale and shared devices available while producing output.
#[derive(Clone)]
pub struct SkillContext {
    pub locale: Locale,
    pub speech: Arc<dyn SpeechOutput>,
    pub settings: Arc<dyn SettingsStore>,
}

impl SkillContext {
    pub fn new(
        locale: Locale,
        speech: Arc<dyn SpeechOutput>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            locale,
            speech,
            settings,
        }
    }

    /// Pick the string for the current locale.
    pub fn localized<'a>(&self, ru: &'a str, en: &'a str) -> &'a str {
        match self.locale {
            Locale::Ru => ru,
            Locale::En => en,
        }
    }
}

impl fmt::Debug for SkillContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillContext")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}
