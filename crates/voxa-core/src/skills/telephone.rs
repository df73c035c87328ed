//! Calling contacts by spoken name.
//!
//! "позвони маме" ranks the address book by [`name_distance`]. A clear,
//! single-number winner goes straight to a yes/no confirmation; anything
//! else is listed and a choice follow-up is installed, answered by name or
//! by ordinal ("второй").

use std::sync::Arc;

use tracing::{debug, info, warn};

use voxa_types::config::TelephoneConfig;
use voxa_types::contact::Contact;
use voxa_types::error::PatternError;
use voxa_types::locale::Locale;
use voxa_types::output::Rendering;
use voxa_types::score::Specificity;
use voxa_types::skill::SkillMeta;

use super::yes_no::{YesNoSkill, yes_no_patterns};
use crate::port::{ContactBook, Dialer};
use crate::recognizer::{Extraction, Pattern};
use crate::skill::{FuzzySkill, InteractionPlan, Skill, SkillContext, SkillInfo, SkillOutput};
use crate::text::name_distance;
use crate::text::numbers::parse_number_at;

pub const TELEPHONE_ID: &str = "telephone";
const CHOICE_ID: &str = "telephone_choice";

/// A runner-up must be this much worse for a direct call.
const DIRECT_CALL_MARGIN: i32 = 2;

/// Contact lookup and call placement shared by the skill and its follow-ups.
struct Phone {
    contacts: Arc<dyn ContactBook>,
    dialer: Arc<dyn Dialer>,
    config: TelephoneConfig,
    /// Accepts any answer to a listing and passes it through verbatim.
    answer_pattern: Pattern<String>,
    confirm_patterns: Vec<Pattern<bool>>,
}

impl Phone {
    /// Contacts closer than the threshold, best first. Ties keep book order.
    fn ranked(&self, query: &str) -> Vec<(i32, Contact)> {
        let mut ranked: Vec<(i32, Contact)> = self
            .contacts
            .contacts()
            .into_iter()
            .filter_map(|contact| {
                let distance = name_distance(query, &contact.name);
                (distance < self.config.contact_threshold).then_some((distance, contact))
            })
            .collect();
        ranked.sort_by_key(|(distance, _)| *distance);
        ranked
    }

    fn resolve(self: &Arc<Self>, query: &str, locale: Locale) -> SkillOutput {
        let ranked = self.ranked(query);
        debug!(query, candidates = ranked.len(), "contact lookup");

        let callable: Vec<(i32, Contact)> = ranked
            .into_iter()
            .filter(|(_, contact)| !contact.numbers.is_empty())
            .collect();

        let Some((best_distance, best)) = callable.first() else {
            let speech = match locale {
                Locale::Ru => format!("Не нашёл контакт {query}"),
                Locale::En => format!("I couldn't find {query} in your contacts"),
            };
            return SkillOutput::not_found(speech, query);
        };

        let clear_winner = *best_distance < self.config.direct_call_threshold
            && best.numbers.len() == 1
            && callable
                .get(1)
                .is_none_or(|(next, _)| *next > best_distance + DIRECT_CALL_MARGIN);
        let only_choice = callable.len() == 1 && best.numbers.len() == 1;

        if clear_winner || only_choice {
            return self.confirm(&best.name, &best.numbers[0], locale);
        }

        let options = callable
            .into_iter()
            .take(self.config.max_candidates.max(1))
            .map(|(_, contact)| contact)
            .collect();
        self.offer(options, locale)
    }

    /// A contact was picked: confirm it, or list its numbers when it has several.
    fn picked(self: &Arc<Self>, contact: Contact, locale: Locale) -> SkillOutput {
        match contact.numbers.as_slice() {
            [number] => self.confirm(&contact.name, number, locale),
            numbers => {
                let options = numbers
                    .iter()
                    .map(|number| Contact::new(contact.name.clone(), vec![number.clone()]))
                    .collect();
                self.offer(options, locale)
            }
        }
    }

    fn offer(self: &Arc<Self>, options: Vec<Contact>, locale: Locale) -> SkillOutput {
        let listing = options
            .iter()
            .enumerate()
            .map(|(i, contact)| format!("{}. {} {}", i + 1, contact.name, contact.numbers.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        let speech = match locale {
            Locale::Ru => format!("Кому позвонить? {listing}"),
            Locale::En => format!("Who should I call? {listing}"),
        };

        let choice = ContactChoiceSkill::arc(Arc::clone(self), options.clone());
        SkillOutput::new(speech)
            .with_rendering(Rendering::ContactChoices { contacts: options })
            .with_plan(InteractionPlan::replace(true, vec![choice]))
    }

    fn confirm(&self, name: &str, number: &str, locale: Locale) -> SkillOutput {
        let speech = match locale {
            Locale::Ru => format!("Позвонить контакту {name} по номеру {number}?"),
            Locale::En => format!("Call {name} at {number}?"),
        };

        let dialer = Arc::clone(&self.dialer);
        let (name, number) = (name.to_string(), number.to_string());
        let rendering = Rendering::ConfirmCall {
            name: name.clone(),
            number: number.clone(),
        };
        let answer = YesNoSkill::arc(&self.confirm_patterns, move |yes, locale| {
            let output = if yes {
                place_call(dialer.as_ref(), &name, &number, locale)
            } else {
                SkillOutput::new(match locale {
                    Locale::Ru => "Хорошо, не звоню",
                    Locale::En => "Okay, not calling",
                })
            };
            Box::pin(async move { output })
        });

        SkillOutput::new(speech)
            .with_rendering(rendering)
            .with_plan(InteractionPlan::replace(true, vec![answer]))
    }
}

fn place_call(dialer: &dyn Dialer, name: &str, number: &str, locale: Locale) -> SkillOutput {
    match dialer.call(number) {
        Ok(()) => {
            info!(name, number, "call placed");
            let speech = match locale {
                Locale::Ru => format!("Звоню: {name}"),
                Locale::En => format!("Calling {name}"),
            };
            SkillOutput::new(speech).with_rendering(Rendering::CallPlaced {
                name: name.to_string(),
                number: number.to_string(),
            })
        }
        Err(e) => {
            warn!(number, error = %e, "call failed");
            let speech = match locale {
                Locale::Ru => "Не получилось позвонить",
                Locale::En => "I couldn't place the call",
            };
            SkillOutput::upstream_failure(speech, number)
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level skill
// ---------------------------------------------------------------------------

pub struct TelephoneSkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<String>>,
    phone: Arc<Phone>,
}

impl TelephoneSkill {
    pub fn new(
        contacts: Arc<dyn ContactBook>,
        dialer: Arc<dyn Dialer>,
        config: TelephoneConfig,
    ) -> Result<Self, PatternError> {
        let who = |extraction: &Extraction<'_>| extraction.group("who").unwrap_or_default().to_string();
        let answer_pattern = Pattern::new("первый", r"^(?P<answer>.+)$", |extraction| {
            extraction.group("answer").unwrap_or_default().to_string()
        })?;
        let patterns = vec![
            Pattern::new(
                "позвони маме",
                r"^(?:позвони|набери|позвонить|звони|вызови|набрать)\s+(?:мне\s+)?(?P<who>.+)$",
                who,
            )?,
            Pattern::new("call mom", r"^(?:call|phone|dial|ring)\s+(?P<who>.+)$", who)?,
        ];
        Ok(Self {
            meta: SkillMeta::new(TELEPHONE_ID, Specificity::Medium),
            patterns,
            phone: Arc::new(Phone {
                contacts,
                dialer,
                config,
                answer_pattern,
                confirm_patterns: yes_no_patterns()?,
            }),
        })
    }
}

impl FuzzySkill for TelephoneSkill {
    type Input = String;

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<String>] {
        &self.patterns
    }

    async fn generate_output(&self, ctx: &SkillContext, who: String) -> SkillOutput {
        self.phone.resolve(&who, ctx.locale)
    }
}

// ---------------------------------------------------------------------------
// Choice follow-up
// ---------------------------------------------------------------------------

/// Picks one of the listed contacts by name or position.
struct ContactChoiceSkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<String>>,
    phone: Arc<Phone>,
    options: Vec<Contact>,
}

impl ContactChoiceSkill {
    fn arc(phone: Arc<Phone>, options: Vec<Contact>) -> Arc<dyn Skill> {
        Arc::new(Self {
            meta: SkillMeta::new(CHOICE_ID, Specificity::Low),
            patterns: vec![phone.answer_pattern.clone()],
            phone,
            options,
        })
    }

    fn choose(&self, answer: &str) -> Option<Contact> {
        // A number listing repeats one name; only position can pick there.
        let names_differ = self
            .options
            .iter()
            .any(|contact| contact.name != self.options[0].name);
        if names_differ {
            let by_name = self
                .options
                .iter()
                .map(|contact| (name_distance(answer, &contact.name), contact))
                .filter(|(distance, _)| *distance < self.phone.config.contact_threshold)
                .min_by_key(|(distance, _)| *distance);
            if let Some((_, contact)) = by_name {
                return Some(contact.clone());
            }
        }

        let position = ordinal(answer)?;
        self.options.get(position.checked_sub(1)?).cloned()
    }
}

impl FuzzySkill for ContactChoiceSkill {
    type Input = String;

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<String>] {
        &self.patterns
    }

    async fn generate_output(&self, ctx: &SkillContext, answer: String) -> SkillOutput {
        match self.choose(&answer) {
            Some(contact) => self.phone.picked(contact, ctx.locale),
            None => {
                debug!(%answer, "no contact chosen");
                SkillOutput::new(ctx.localized(
                    "Не понял, кого выбрать. Назови имя или номер в списке",
                    "Sorry, which one? Say a name or a number from the list",
                ))
                .with_plan(InteractionPlan::ContinueSubInteraction)
            }
        }
    }
}

/// Position named in an answer: "второй", "номер 2", "third".
fn ordinal(answer: &str) -> Option<usize> {
    const ORDINALS: [(&str, usize); 10] = [
        ("перв", 1),
        ("втор", 2),
        ("трет", 3),
        ("четв", 4),
        ("пят", 5),
        ("first", 1),
        ("second", 2),
        ("third", 3),
        ("fourth", 4),
        ("fifth", 5),
    ];

    let words: Vec<&str> = answer.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        if let Some((_, n)) = ORDINALS.iter().find(|(prefix, _)| word.starts_with(prefix)) {
            return Some(*n);
        }
        if let Some((value, _)) = parse_number_at(&words, i) {
            if value >= 1.0 && value.fract() == 0.0 {
                return Some(value as usize);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub struct TelephoneInfo {
    pub contacts: Arc<dyn ContactBook>,
    pub dialer: Arc<dyn Dialer>,
    pub config: TelephoneConfig,
}

impl SkillInfo for TelephoneInfo {
    fn id(&self) -> &str {
        TELEPHONE_ID
    }

    fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Телефон",
            Locale::En => "Telephone",
        }
    }

    fn sentence_example(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Позвони маме",
            Locale::En => "Call mom",
        }
    }

    fn build(&self, _ctx: &SkillContext) -> Result<Arc<dyn Skill>, PatternError> {
        Ok(Arc::new(TelephoneSkill::new(
            Arc::clone(&self.contacts),
            Arc::clone(&self.dialer),
            self.config.clone(),
        )?))
    }
}
