//! Skill factories.

use std::sync::Arc;

use voxa_types::error::PatternError;
use voxa_types::locale::Locale;

use super::context::SkillContext;
use super::traits::Skill;

/// Static description of a skill plus a factory for instances.
///
/// Instances are rebuilt whenever the enabled set changes, so a skill may
/// capture context-dependent state (locale, settings) at build time.
pub trait SkillInfo: Send + Sync {
    /// Stable registry id, e.g. `"timer"`.
    fn id(&self) -> &str;

    fn name(&self, locale: Locale) -> &'static str;

    /// A phrase that triggers the skill, shown in listings.
    fn sentence_example(&self, locale: Locale) -> &'static str;

    fn is_available(&self, _ctx: &SkillContext) -> bool {
        true
    }

    /// Build an instance. A malformed pattern is a registration error.
    fn build(&self, ctx: &SkillContext) -> Result<Arc<dyn Skill>, PatternError>;
}
