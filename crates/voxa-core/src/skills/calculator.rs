//! Spoken arithmetic: "сколько будет два плюс три умножить на четыре".
//!
//! Numbers come from digits or number words; the text between two numbers
//! is matched against operator phrases with the fuzzy scorer. Below
//! [`OPERATOR_CONFIDENCE`] the operator is assumed to be addition.

use std::sync::Arc;

use tracing::debug;

use voxa_types::error::PatternError;
use voxa_types::locale::Locale;
use voxa_types::output::Rendering;
use voxa_types::score::Specificity;
use voxa_types::skill::SkillMeta;

use crate::recognizer::{Extraction, Pattern};
use crate::skill::{FuzzySkill, Skill, SkillContext, SkillInfo, SkillOutput};
use crate::text::numbers::{NumberToken, tokenize_numbers};
use crate::text::similarity;

pub const CALCULATOR_ID: &str = "calculator";

/// Minimum similarity for an operator phrase to count as recognized.
pub const OPERATOR_CONFIDENCE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

const OPERATOR_WORDS: [(Operator, &[&str]); 5] = [
    (Operator::Add, &["+", "плюс", "прибавить", "прибавь", "сложить с", "plus", "add"]),
    (Operator::Subtract, &["-", "минус", "отнять", "вычесть", "minus", "subtract"]),
    (
        Operator::Multiply,
        &["*", "умножить на", "умножить", "помножить на", "x", "times", "multiplied by"],
    ),
    (
        Operator::Divide,
        &["/", "разделить на", "поделить на", "делить на", "divided by", "over"],
    ),
    (Operator::Power, &["^", "в степени", "в степень", "to the power of", "power"]),
];

impl Operator {
    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Power => "^",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Subtract => 1,
            Self::Multiply | Self::Divide => 2,
            Self::Power => 3,
        }
    }

    /// `None` on division by zero.
    fn apply(self, a: f64, b: f64) -> Option<f64> {
        match self {
            Self::Add => Some(a + b),
            Self::Subtract => Some(a - b),
            Self::Multiply => Some(a * b),
            Self::Divide => (b != 0.0).then(|| a / b),
            Self::Power => Some(a.powf(b)),
        }
    }

    /// Closest operator to a phrase, falling back to addition.
    fn recognize(phrase: &str) -> Self {
        let best = OPERATOR_WORDS
            .iter()
            .flat_map(|(op, words)| words.iter().map(move |word| (similarity(phrase, word), *op)))
            .fold(None, |best: Option<(f32, Operator)>, (score, op)| match best {
                Some((best_score, _)) if best_score >= score => best,
                _ => Some((score, op)),
            });
        match best {
            Some((score, op)) if score >= OPERATOR_CONFIDENCE => op,
            _ => {
                debug!(phrase, "ambiguous operator, assuming addition");
                Self::Add
            }
        }
    }
}

fn is_minus(word: &str) -> bool {
    matches!(word, "-" | "минус" | "minus")
}

/// Numbers and the operators between them; `numbers.len() == operators.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    numbers: Vec<f64>,
    operators: Vec<Operator>,
}

impl Expression {
    /// Parse normalized text. `None` when it holds no number.
    pub fn parse(text: &str) -> Option<Self> {
        let mut numbers = Vec::new();
        let mut operators = Vec::new();
        let mut pending: Option<Operator> = None;
        let mut negate = false;

        for token in tokenize_numbers(text) {
            match token {
                NumberToken::Number(value) => {
                    let value = if std::mem::take(&mut negate) { -value } else { value };
                    if !numbers.is_empty() {
                        operators.push(pending.take().unwrap_or_else(|| {
                            debug!("no operator between numbers, assuming addition");
                            Operator::Add
                        }));
                    }
                    numbers.push(value);
                }
                NumberToken::Text(phrase) => {
                    if numbers.is_empty() {
                        negate = phrase.split_whitespace().last().is_some_and(is_minus);
                        continue;
                    }
                    // "умножить на минус 3": a trailing sign belongs to the next number.
                    let mut words: Vec<&str> = phrase.split_whitespace().collect();
                    if words.len() > 1 && words.last().is_some_and(|w| is_minus(w)) {
                        words.pop();
                        negate = true;
                    }
                    pending = Some(Operator::recognize(&words.join(" ")));
                }
            }
        }

        (!numbers.is_empty()).then_some(Self { numbers, operators })
    }

    /// Evaluate with `^` above `* /` above `+ -`; `^` is right-associative.
    ///
    /// `None` on division by zero or a non-finite result.
    pub fn evaluate(&self) -> Option<f64> {
        let mut values = vec![*self.numbers.first()?];
        let mut stack: Vec<Operator> = Vec::new();

        for (op, &number) in self.operators.iter().zip(&self.numbers[1..]) {
            while let Some(&top) = stack.last() {
                let binds_tighter = top.precedence() > op.precedence()
                    || (top.precedence() == op.precedence() && *op != Operator::Power);
                if !binds_tighter {
                    break;
                }
                stack.pop();
                reduce(&mut values, top)?;
            }
            stack.push(*op);
            values.push(number);
        }
        while let Some(top) = stack.pop() {
            reduce(&mut values, top)?;
        }

        values.pop().filter(|value| value.is_finite())
    }

    /// Symbolic form, e.g. `2 + 3 * 4`.
    pub fn interpretation(&self) -> String {
        let mut out = format_number(self.numbers[0]);
        for (op, number) in self.operators.iter().zip(&self.numbers[1..]) {
            out.push_str(&format!(" {} {}", op.symbol(), format_number(*number)));
        }
        out
    }
}

fn reduce(values: &mut Vec<f64>, op: Operator) -> Option<()> {
    let b = values.pop()?;
    let a = values.pop()?;
    values.push(op.apply(a, b)?);
    Some(())
}

/// Integers without a fraction, otherwise up to four decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let fixed = format!("{value:.4}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub struct CalculatorSkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<String>>,
}

impl CalculatorSkill {
    pub fn new() -> Result<Self, PatternError> {
        let expr = |extraction: &Extraction<'_>| extraction.group("expr").unwrap_or_default().to_string();
        Ok(Self {
            meta: SkillMeta::new(CALCULATOR_ID, Specificity::Medium),
            patterns: vec![
                Pattern::new(
                    "сколько будет два плюс два",
                    r"^(?:сколько\s+будет|посчитай|вычисли|calculate|compute|what\s+is|how\s+much\s+is)\s+(?P<expr>.+)$",
                    expr,
                )?,
                Pattern::new("2 плюс 2", r"^(?P<expr>(?:-\s+)?\d.*\d)$", expr)?,
            ],
        })
    }
}

impl FuzzySkill for CalculatorSkill {
    type Input = String;

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<String>] {
        &self.patterns
    }

    async fn generate_output(&self, ctx: &SkillContext, text: String) -> SkillOutput {
        let Some(expression) = Expression::parse(&text) else {
            return SkillOutput::new(ctx.localized("Не нашёл чисел", "I didn't hear any numbers"))
                .with_rendering(Rendering::Calculation {
                    interpretation: text,
                    result: None,
                });
        };

        let interpretation = expression.interpretation();
        let result = expression.evaluate().map(format_number);
        debug!(%interpretation, ?result, "calculated");

        let speech = match (&result, ctx.locale) {
            (Some(result), Locale::Ru) => format!("Получается {result}"),
            (Some(result), Locale::En) => format!("That's {result}"),
            (None, _) => ctx.localized("Это не посчитать", "I can't compute that").to_string(),
        };
        SkillOutput::new(speech).with_rendering(Rendering::Calculation {
            interpretation,
            result,
        })
    }
}

pub struct CalculatorInfo;

impl SkillInfo for CalculatorInfo {
    fn id(&self) -> &str {
        CALCULATOR_ID
    }

    fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Калькулятор",
            Locale::En => "Calculator",
        }
    }

    fn sentence_example(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Сколько будет два плюс два",
            Locale::En => "What is two plus two",
        }
    }

    fn build(&self, _ctx: &SkillContext) -> Result<Arc<dyn Skill>, PatternError> {
        Ok(Arc::new(CalculatorSkill::new()?))
    }
}
