//! Number words in Russian and English.
//!
//! Parsing works on normalized words (so `й`/`ё` are already folded) and
//! understands digits, compound number words ("двадцать пять", "one hundred
//! twenty"), multipliers ("тысяча", "thousand") and "полтора".

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Unit,
    Teen,
    Ten,
    Hundred,
    Thousand,
}

#[derive(Debug, Clone, Copy)]
enum NumberWord {
    Value(f64, Tier),
    /// English "hundred": multiplies what precedes it.
    HundredMultiplier,
    ThousandMultiplier,
    Fraction(f64),
}

fn number_word(word: &str) -> Option<NumberWord> {
    use NumberWord::*;
    use Tier::*;

    let parsed = match word {
        "ноль" | "нуль" | "zero" => Value(0.0, Unit),
        "один" | "одна" | "одно" | "одну" | "one" => Value(1.0, Unit),
        "два" | "две" | "two" => Value(2.0, Unit),
        "три" | "three" => Value(3.0, Unit),
        "четыре" | "four" => Value(4.0, Unit),
        "пять" | "five" => Value(5.0, Unit),
        "шесть" | "six" => Value(6.0, Unit),
        "семь" | "seven" => Value(7.0, Unit),
        "восемь" | "eight" => Value(8.0, Unit),
        "девять" | "nine" => Value(9.0, Unit),
        "десять" | "ten" => Value(10.0, Teen),
        "одиннадцать" | "eleven" => Value(11.0, Teen),
        "двенадцать" | "twelve" => Value(12.0, Teen),
        "тринадцать" | "thirteen" => Value(13.0, Teen),
        "четырнадцать" | "fourteen" => Value(14.0, Teen),
        "пятнадцать" | "fifteen" => Value(15.0, Teen),
        "шестнадцать" | "sixteen" => Value(16.0, Teen),
        "семнадцать" | "seventeen" => Value(17.0, Teen),
        "восемнадцать" | "eighteen" => Value(18.0, Teen),
        "девятнадцать" | "nineteen" => Value(19.0, Teen),
        "двадцать" | "twenty" => Value(20.0, Ten),
        "тридцать" | "thirty" => Value(30.0, Ten),
        "сорок" | "forty" => Value(40.0, Ten),
        "пятьдесят" | "fifty" => Value(50.0, Ten),
        "шестьдесят" | "sixty" => Value(60.0, Ten),
        "семьдесят" | "seventy" => Value(70.0, Ten),
        "восемьдесят" | "eighty" => Value(80.0, Ten),
        "девяносто" | "ninety" => Value(90.0, Ten),
        "сто" => Value(100.0, Hundred),
        "двести" => Value(200.0, Hundred),
        "триста" => Value(300.0, Hundred),
        "четыреста" => Value(400.0, Hundred),
        "пятьсот" => Value(500.0, Hundred),
        "шестьсот" => Value(600.0, Hundred),
        "семьсот" => Value(700.0, Hundred),
        "восемьсот" => Value(800.0, Hundred),
        "девятьсот" => Value(900.0, Hundred),
        "hundred" | "hundreds" => HundredMultiplier,
        "тысяча" | "тысячи" | "тысяч" | "тысячу" | "thousand" => ThousandMultiplier,
        "полтора" | "полторы" => Fraction(1.5),
        "half" | "пол" => Fraction(0.5),
        _ => return None,
    };
    Some(parsed)
}

fn can_follow(previous: Option<Tier>, next: Tier) -> bool {
    match previous {
        None => true,
        Some(Tier::Thousand) => next != Tier::Thousand,
        Some(Tier::Hundred) => matches!(next, Tier::Ten | Tier::Teen | Tier::Unit),
        Some(Tier::Ten) => next == Tier::Unit,
        Some(Tier::Unit) | Some(Tier::Teen) => false,
    }
}

/// Parse the number starting at `words[start]`.
///
/// Returns the value and how many words it consumed, or `None` when
/// `words[start]` does not begin a number.
pub fn parse_number_at(words: &[&str], start: usize) -> Option<(f64, usize)> {
    let first = *words.get(start)?;
    if let Ok(value) = first.parse::<f64>() {
        if value.is_finite() {
            return Some((value, 1));
        }
    }

    let mut total = 0.0;
    let mut current = 0.0;
    let mut last: Option<Tier> = None;
    let mut used = 0;

    for word in &words[start..] {
        let Some(parsed) = number_word(word) else {
            break;
        };
        match parsed {
            NumberWord::Value(value, tier) => {
                if !can_follow(last, tier) {
                    break;
                }
                current += value;
                last = Some(tier);
            }
            NumberWord::HundredMultiplier => {
                if !matches!(last, None | Some(Tier::Unit) | Some(Tier::Thousand)) {
                    break;
                }
                let base = if last == Some(Tier::Unit) { current } else { 1.0 };
                current = if last == Some(Tier::Unit) { 0.0 } else { current };
                current += base * 100.0;
                last = Some(Tier::Hundred);
            }
            NumberWord::ThousandMultiplier => {
                if last == Some(Tier::Thousand) {
                    break;
                }
                let multiplier = if last.is_none() { 1.0 } else { current };
                total += multiplier * 1000.0;
                current = 0.0;
                last = Some(Tier::Thousand);
            }
            NumberWord::Fraction(value) => {
                if last.is_none() {
                    current = value;
                    used += 1;
                }
                break;
            }
        }
        used += 1;
    }

    (used > 0).then_some((total + current, used))
}

/// Split text into numbers and the word runs between them.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberToken {
    Number(f64),
    Text(String),
}

/// Tokenize normalized text into alternating numbers and text runs.
pub fn tokenize_numbers(normalized: &str) -> Vec<NumberToken> {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let mut tokens = Vec::new();
    let mut text: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < words.len() {
        if let Some((value, used)) = parse_number_at(&words, i) {
            if !text.is_empty() {
                tokens.push(NumberToken::Text(text.join(" ")));
                text.clear();
            }
            tokens.push(NumberToken::Number(value));
            i += used;
        } else {
            text.push(words[i]);
            i += 1;
        }
    }
    if !text.is_empty() {
        tokens.push(NumberToken::Text(text.join(" ")));
    }

    tokens
}

/// Pick the Russian plural form for `n`: "1 минута", "2 минуты", "5 минут".
pub fn russian_plural<'a>(n: u64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let last_two = n % 100;
    if (11..=14).contains(&last_two) {
        return many;
    }
    match n % 10 {
        1 => one,
        2..=4 => few,
        _ => many,
    }
}

const RU_UNITS_MASCULINE: [&str; 20] = [
    "ноль", "один", "два", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять", "десять",
    "одиннадцать", "двенадцать", "тринадцать", "четырнадцать", "пятнадцать", "шестнадцать",
    "семнадцать", "восемнадцать", "девятнадцать",
];

const RU_TENS: [&str; 10] = [
    "", "", "двадцать", "тридцать", "сорок", "пятьдесят", "шестьдесят", "семьдесят",
    "восемьдесят", "девяносто",
];

/// Spell out `0..=99` in Russian. Feminine nouns ("минута") take
/// "одна"/"две" instead of "один"/"два".
pub fn russian_words(n: u32, feminine: bool) -> String {
    let unit = |value: u32| -> &'static str {
        match (value, feminine) {
            (1, true) => "одна",
            (2, true) => "две",
            _ => RU_UNITS_MASCULINE[value as usize],
        }
    };

    let n = n % 100;
    if n < 20 {
        return unit(n).to_string();
    }
    let tens = RU_TENS[(n / 10) as usize];
    match n % 10 {
        0 => tens.to_string(),
        ones => format!("{tens} {}", unit(ones)),
    }
}
