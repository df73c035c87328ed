//! Duration extraction ("5 минут", "полтора часа", "one hour 30 minutes").

use std::time::Duration;

use voxa_types::locale::Locale;

use super::numbers::{parse_number_at, russian_plural};

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = 60_000.0;
const HOUR_MS: f64 = 3_600_000.0;

fn unit_millis(word: &str) -> Option<f64> {
    if word.starts_with("сек") || word.starts_with("sec") {
        Some(SECOND_MS)
    } else if word.starts_with("мин") || word.starts_with("min") {
        Some(MINUTE_MS)
    } else if word.starts_with("час") || word.starts_with("hour") {
        Some(HOUR_MS)
    } else {
        None
    }
}

/// Extract a duration from normalized text.
///
/// Each unit word consumes the most recent number before it; a unit with no
/// number counts once ("таймер на минуту"). Returns `None` when no unit is
/// present, the total is zero, or it does not fit in a `Duration`.
pub fn parse_duration(normalized: &str) -> Option<Duration> {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let mut total_ms = 0.0;
    let mut found_unit = false;
    let mut pending: Option<f64> = None;
    let mut i = 0;

    while i < words.len() {
        if let Some((value, used)) = parse_number_at(&words, i) {
            pending = Some(value);
            i += used;
            continue;
        }

        let word = words[i];
        if word == "полчаса" {
            total_ms += HOUR_MS / 2.0;
            found_unit = true;
        } else if word == "полминуты" {
            total_ms += MINUTE_MS / 2.0;
            found_unit = true;
        } else if let Some(unit) = unit_millis(word) {
            total_ms += pending.take().unwrap_or(1.0) * unit;
            found_unit = true;
        }
        i += 1;
    }

    (found_unit && total_ms >= 1.0 && total_ms < u64::MAX as f64)
        .then(|| Duration::from_millis(total_ms.round() as u64))
}

/// Spoken form of a duration: "1 час 30 минут", "2 minutes 5 seconds".
pub fn format_duration(duration: Duration, locale: Locale) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    match locale {
        Locale::Ru => {
            if hours > 0 {
                parts.push(format!("{hours} {}", russian_plural(hours, "час", "часа", "часов")));
            }
            if minutes > 0 {
                parts.push(format!(
                    "{minutes} {}",
                    russian_plural(minutes, "минута", "минуты", "минут")
                ));
            }
            if seconds > 0 || parts.is_empty() {
                parts.push(format!(
                    "{seconds} {}",
                    russian_plural(seconds, "секунда", "секунды", "секунд")
                ));
            }
        }
        Locale::En => {
            let unit = |n: u64, word: &str| {
                if n == 1 {
                    format!("1 {word}")
                } else {
                    format!("{n} {word}s")
                }
            };
            if hours > 0 {
                parts.push(unit(hours, "hour"));
            }
            if minutes > 0 {
                parts.push(unit(minutes, "minute"));
            }
            if seconds > 0 || parts.is_empty() {
                parts.push(unit(seconds, "second"));
            }
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize;

    fn parse(text: &str) -> Option<u128> {
        parse_duration(&normalize(text)).map(|d| d.as_millis())
    }

    #[test]
    fn test_parse_simple_units() {
        assert_eq!(parse("5 минут"), Some(300_000));
        assert_eq!(parse("30 секунд"), Some(30_000));
        assert_eq!(parse("2 часа"), Some(7_200_000));
        assert_eq!(parse("10 minutes"), Some(600_000));
    }

    #[test]
    fn test_parse_words_and_combinations() {
        assert_eq!(parse("пять минут"), Some(300_000));
        assert_eq!(parse("час тридцать минут"), Some(5_400_000));
        assert_eq!(parse("1 hour 30 minutes"), Some(5_400_000));
        assert_eq!(parse("полторы минуты"), Some(90_000));
        assert_eq!(parse("полчаса"), Some(1_800_000));
        assert_eq!(parse("half an hour"), Some(1_800_000));
        assert_eq!(parse("минуту"), Some(60_000));
    }

    #[test]
    fn test_parse_without_unit_is_none() {
        assert_eq!(parse("пять"), None);
        assert_eq!(parse("пиццу"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("0 минут"), None);
        assert_eq!(parse("99999999999999999999 минут"), None);
    }

    #[test]
    fn test_format_duration_russian_plurals() {
        assert_eq!(format_duration(Duration::from_secs(300), Locale::Ru), "5 минут");
        assert_eq!(format_duration(Duration::from_secs(60), Locale::Ru), "1 минута");
        assert_eq!(
            format_duration(Duration::from_secs(5_400), Locale::Ru),
            "1 час 30 минут"
        );
        assert_eq!(format_duration(Duration::from_secs(0), Locale::Ru), "0 секунд");
    }

    #[test]
    fn test_format_duration_english() {
        assert_eq!(format_duration(Duration::from_secs(61), Locale::En), "1 minute 1 second");
        assert_eq!(format_duration(Duration::from_secs(7_200), Locale::En), "2 hours");
    }
}
