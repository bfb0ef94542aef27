//! Locale-fixed number formatting and numeric validators
//!
//! Numbers are read and written with `en_US_POSIX` conventions: `.` as the
//! decimal point, `,` as the grouping separator and `$` as the currency
//! symbol. Parsing never depends on the device locale.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::answer::AnswerValue;
use crate::error::{InputError, InputResult, DEFAULT_INVALID_NUMBER_MESSAGE};
use crate::validator::TextInputValidator;

/// Presentation style of a number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberFormatStyle {
    /// Plain digits, no grouping
    #[default]
    None,
    /// Digits with grouping separators
    Decimal,
    /// Dollar amount
    Currency,
    /// Fraction shown as a percentage
    Percent,
    /// Mantissa and exponent
    Scientific,
    /// English words
    SpellOut,
    /// Whole number with an English ordinal suffix
    Ordinal,
}

impl NumberFormatStyle {
    /// All styles in declaration order
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Decimal,
        Self::Currency,
        Self::Percent,
        Self::Scientific,
        Self::SpellOut,
        Self::Ordinal,
    ];
}

/// Number formatter with a fixed locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormatter {
    style: NumberFormatStyle,
    uses_grouping_separator: bool,
    maximum_fraction_digits: usize,
}

impl NumberFormatter {
    /// Create a formatter with grouping enabled and two fraction digits
    #[inline]
    #[must_use]
    pub fn new(style: NumberFormatStyle) -> Self {
        Self {
            style,
            uses_grouping_separator: true,
            maximum_fraction_digits: 2,
        }
    }

    /// Enable or disable grouping separators
    #[inline]
    #[must_use]
    pub fn with_grouping(mut self, uses_grouping_separator: bool) -> Self {
        self.uses_grouping_separator = uses_grouping_separator;
        self
    }

    /// Set the maximum number of fraction digits written
    #[inline]
    #[must_use]
    pub fn with_maximum_fraction_digits(mut self, digits: usize) -> Self {
        self.maximum_fraction_digits = digits;
        self
    }

    /// Presentation style
    #[inline]
    #[must_use]
    pub fn style(&self) -> NumberFormatStyle {
        self.style
    }

    /// Render a number
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        let digits = self.maximum_fraction_digits;
        match self.style {
            NumberFormatStyle::None => plain(value, digits, false),
            NumberFormatStyle::Decimal => plain(value, digits, self.uses_grouping_separator),
            NumberFormatStyle::Currency => {
                let body = group(&format!("{:.*}", digits, value.abs()), self.uses_grouping_separator);
                let sign = if value < 0.0 && body.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
                    "-"
                } else {
                    ""
                };
                format!("{sign}${body}")
            }
            NumberFormatStyle::Percent => {
                format!("{}%", plain(value * 100.0, digits, self.uses_grouping_separator))
            }
            NumberFormatStyle::Scientific => scientific(value, digits),
            NumberFormatStyle::SpellOut => spell_out(value, digits),
            NumberFormatStyle::Ordinal => ordinal(value),
        }
    }

    /// Read a number written in this style
    ///
    /// Returns `None` for empty or unparsable text.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let grouping = self.uses_grouping_separator;
        match self.style {
            NumberFormatStyle::None => parse_plain(text, false),
            NumberFormatStyle::Decimal => parse_plain(text, grouping),
            NumberFormatStyle::Currency => {
                let (negative, body) = split_sign(text);
                let body = body.strip_prefix('$').unwrap_or(body);
                parse_plain(body, grouping).map(|value| if negative { -value } else { value })
            }
            NumberFormatStyle::Percent => {
                let body = text.strip_suffix('%').unwrap_or(text).trim_end();
                parse_plain(body, grouping).map(|value| value / 100.0)
            }
            NumberFormatStyle::Scientific => parse_scientific(text),
            NumberFormatStyle::SpellOut => parse_spelled(text),
            NumberFormatStyle::Ordinal => parse_ordinal(text),
        }
    }
}

impl Default for NumberFormatter {
    fn default() -> Self {
        Self::new(NumberFormatStyle::None)
    }
}

fn plain(value: f64, digits: usize, grouping: bool) -> String {
    let fixed = format!("{:.*}", digits, value.abs());
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    let body = group(trimmed, grouping);
    if value < 0.0 && trimmed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        format!("-{body}")
    } else {
        body
    }
}

fn group(unsigned: &str, grouping: bool) -> String {
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    let mut out = String::with_capacity(unsigned.len() + integer.len() / 3);
    for (index, ch) in integer.chars().enumerate() {
        if grouping && index > 0 && (integer.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

#[allow(clippy::cast_possible_truncation)]
fn scientific(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}E0", plain(value, digits, false));
    }
    let mut exponent = value.abs().log10().floor() as i32;
    let mut mantissa = plain(value / 10f64.powi(exponent), digits, false);
    if mantissa.trim_start_matches('-').starts_with("10") {
        exponent += 1;
        mantissa = plain(value / 10f64.powi(exponent), digits, false);
    }
    format!("{mantissa}E{exponent}")
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ordinal(value: f64) -> String {
    let whole = value.round() as i64;
    let last_two = whole.unsigned_abs() % 100;
    let suffix = if (11..=13).contains(&last_two) {
        "th"
    } else {
        match last_two % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{whole}{suffix}")
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 4] = [
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

/// Largest magnitude written out in words
const SPELL_OUT_LIMIT: f64 = 1e15;

#[allow(clippy::cast_possible_truncation)]
fn spell_below_thousand(number: u64) -> String {
    let hundreds = number / 100;
    let rest = number % 100;
    let mut words = Vec::new();
    if hundreds > 0 {
        words.push(format!("{} hundred", ONES[hundreds as usize]));
    }
    if rest >= 20 {
        let tens = TENS[(rest / 10) as usize];
        if rest % 10 == 0 {
            words.push(tens.to_string());
        } else {
            words.push(format!("{tens}-{}", ONES[(rest % 10) as usize]));
        }
    } else if rest > 0 || hundreds == 0 {
        words.push(ONES[rest as usize].to_string());
    }
    words.join(" ")
}

fn spell_integer(number: u64) -> String {
    if number == 0 {
        return ONES[0].to_string();
    }
    let mut parts = Vec::new();
    let mut rest = number;
    for (scale, name) in SCALES {
        if rest >= scale {
            parts.push(format!("{} {name}", spell_below_thousand(rest / scale)));
            rest %= scale;
        }
    }
    if rest > 0 {
        parts.push(spell_below_thousand(rest));
    }
    parts.join(" ")
}

fn spell_out(value: f64, digits: usize) -> String {
    if !value.is_finite() || value.abs() >= SPELL_OUT_LIMIT {
        return plain(value, digits, false);
    }
    let text = plain(value.abs(), digits, false);
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let Ok(integer) = integer.parse::<u64>() else {
        return plain(value, digits, false);
    };
    let mut words = spell_integer(integer);
    if !fraction.is_empty() {
        words.push_str(" point");
        for digit in fraction.chars().filter_map(|ch| ch.to_digit(10)) {
            words.push(' ');
            words.push_str(ONES[digit as usize]);
        }
    }
    if value < 0.0 && (integer > 0 || !fraction.is_empty()) {
        format!("minus {words}")
    } else {
        words
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    }
}

fn parse_plain(text: &str, allow_grouping: bool) -> Option<f64> {
    let (negative, body) = split_sign(text);
    let mut digits = String::with_capacity(body.len());
    let mut seen_point = false;
    let mut seen_digit = false;
    for ch in body.chars() {
        match ch {
            '0'..='9' => {
                seen_digit = true;
                digits.push(ch);
            }
            '.' if !seen_point => {
                seen_point = true;
                digits.push(ch);
            }
            ',' if allow_grouping && seen_digit && !seen_point => {}
            _ => return None,
        }
    }
    if !seen_digit {
        return None;
    }
    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn parse_scientific(text: &str) -> Option<f64> {
    match text.split_once(|ch: char| ch == 'E' || ch == 'e') {
        Some((mantissa, exponent)) => {
            let mantissa = parse_plain(mantissa, false)?;
            let exponent: i32 = exponent.trim_start_matches('+').parse().ok()?;
            Some(mantissa * 10f64.powi(exponent))
        }
        None => parse_plain(text, false),
    }
}

fn parse_ordinal(text: &str) -> Option<f64> {
    let lower = text.to_ascii_lowercase();
    let body = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
        .unwrap_or(lower.as_str());
    let value = parse_plain(body, false)?;
    (value.fract() == 0.0).then_some(value)
}

fn word_value(word: &str) -> Option<u64> {
    if let Some(index) = ONES.iter().position(|ones| *ones == word) {
        return Some(index as u64);
    }
    TENS.iter()
        .position(|tens| !tens.is_empty() && *tens == word)
        .map(|index| index as u64 * 10)
}

#[allow(clippy::cast_precision_loss)]
fn parse_spelled(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    let mut words = lower
        .split(|ch: char| ch.is_whitespace() || ch == '-')
        .filter(|word| !word.is_empty())
        .peekable();

    let negative = matches!(words.peek(), Some(&("minus" | "negative")));
    if negative {
        words.next();
    }

    let mut total: u64 = 0;
    let mut current: u64 = 0;
    let mut seen_number = false;
    let mut in_fraction = false;
    let mut fraction = String::new();

    for word in words {
        if in_fraction {
            let digit = word_value(word).filter(|digit| *digit < 10)?;
            fraction.push(char::from_digit(u32::try_from(digit).ok()?, 10)?);
            continue;
        }
        match word {
            "and" => {}
            "point" => in_fraction = true,
            "hundred" if seen_number => current = current.checked_mul(100)?,
            _ => {
                if let Some(value) = word_value(word) {
                    current = current.checked_add(value)?;
                    seen_number = true;
                } else if let Some((scale, _)) = SCALES.iter().find(|(_, name)| *name == word) {
                    if !seen_number {
                        return None;
                    }
                    total = total.checked_add(current.checked_mul(*scale)?)?;
                    current = 0;
                } else {
                    return None;
                }
            }
        }
    }

    if !seen_number || (in_fraction && fraction.is_empty()) {
        return None;
    }
    let mut value = total.checked_add(current)? as f64;
    if !fraction.is_empty() {
        value += format!("0.{fraction}").parse::<f64>().ok()?;
    }
    Some(if negative { -value } else { value })
}

/// Participant-facing messages of a numeric validator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidMessages {
    /// Shown when the value is below the minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_invalid_message: Option<String>,
    /// Shown when the value is above the maximum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_invalid_message: Option<String>,
    /// Shown for unreadable input and as the fallback for both bounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_message: Option<String>,
}

impl InvalidMessages {
    /// Message for unreadable input
    #[must_use]
    pub fn invalid(&self) -> &str {
        self.invalid_message
            .as_deref()
            .unwrap_or(DEFAULT_INVALID_NUMBER_MESSAGE)
    }

    /// Message for a value below the minimum
    #[must_use]
    pub fn below_minimum(&self) -> &str {
        self.min_invalid_message.as_deref().unwrap_or_else(|| self.invalid())
    }

    /// Message for a value above the maximum
    #[must_use]
    pub fn above_maximum(&self) -> &str {
        self.max_invalid_message.as_deref().unwrap_or_else(|| self.invalid())
    }
}

/// Shared behavior of the numeric validators
///
/// Implementors supply a formatter, bounds and messages; validation and
/// display are provided.
pub trait NumberValidator {
    /// Formatter used to read and render numbers
    fn formatter(&self) -> NumberFormatter;

    /// Inclusive `(minimum, maximum)` bounds
    fn bounds(&self) -> (Option<f64>, Option<f64>);

    /// Participant-facing messages
    fn messages(&self) -> &InvalidMessages;

    /// Convert an accepted number into the stored answer
    ///
    /// # Errors
    /// `NotANumber` when the value cannot be stored
    fn convert(&self, value: f64) -> InputResult<AnswerValue>;

    /// Stored answer for a whole number read without rounding, if this
    /// validator stores whole numbers as written
    fn exact_integer(&self, _value: i64) -> Option<AnswerValue> {
        None
    }

    /// Check a number against the bounds
    ///
    /// # Errors
    /// `BelowMinimum` or `AboveMaximum`
    fn check_bounds(&self, value: f64) -> InputResult<()> {
        let (minimum, maximum) = self.bounds();
        if let Some(minimum) = minimum.filter(|minimum| value < *minimum) {
            return Err(InputError::BelowMinimum {
                minimum,
                value,
                message: self.messages().below_minimum().to_string(),
            });
        }
        if let Some(maximum) = maximum.filter(|maximum| value > *maximum) {
            return Err(InputError::AboveMaximum {
                maximum,
                value,
                message: self.messages().above_maximum().to_string(),
            });
        }
        Ok(())
    }

    /// Check a number against the bounds and convert it
    ///
    /// # Errors
    /// `BelowMinimum`, `AboveMaximum`, or `NotANumber` for values that are
    /// not finite or cannot be stored
    fn validate_number(&self, value: f64) -> InputResult<AnswerValue> {
        if !value.is_finite() {
            return Err(InputError::NotANumber {
                text: value.to_string(),
                message: self.messages().invalid().to_string(),
            });
        }
        self.check_bounds(value)?;
        self.convert(value)
    }

    /// Check a whole number that is stored without going through `f64`
    ///
    /// Returns `None` when this validator has no exact form for it.
    #[allow(clippy::cast_precision_loss)]
    fn validate_whole(&self, value: i64) -> Option<InputResult<AnswerValue>> {
        let exact = self.exact_integer(value)?;
        Some(self.check_bounds(value as f64).map(|()| exact))
    }

    /// Read and check typed text
    ///
    /// # Errors
    /// `NotANumber` for unreadable text, or for missing text when bounds are
    /// declared; otherwise the bounds errors
    fn validate_number_text(&self, text: Option<&str>) -> InputResult<Option<AnswerValue>> {
        let Some(text) = text.map(str::trim).filter(|text| !text.is_empty()) else {
            let (minimum, maximum) = self.bounds();
            if minimum.is_none() && maximum.is_none() {
                return Ok(None);
            }
            return Err(InputError::NotANumber {
                text: String::new(),
                message: self.messages().invalid().to_string(),
            });
        };
        if let Some(checked) = text.parse::<i64>().ok().and_then(|value| self.validate_whole(value)) {
            return checked.map(Some);
        }
        let value = self
            .formatter()
            .parse(text)
            .ok_or_else(|| InputError::NotANumber {
                text: text.to_string(),
                message: self.messages().invalid().to_string(),
            })?;
        self.validate_number(value).map(Some)
    }

    /// Check an already typed answer
    ///
    /// # Errors
    /// `InvalidType` for non-numeric answers, otherwise as for text
    fn validate_number_answer(&self, answer: Option<&AnswerValue>) -> InputResult<Option<AnswerValue>> {
        match answer {
            None => Ok(None),
            Some(AnswerValue::String(text)) => self.validate_number_text(Some(text)),
            Some(AnswerValue::Integer(value)) if self.exact_integer(*value).is_some() => {
                self.validate_whole(*value).transpose()
            }
            Some(answer) => match answer.as_f64() {
                Some(value) => self.validate_number(value).map(Some),
                None => Err(InputError::invalid_type(format!(
                    "{} is not a string or a number",
                    answer.kind()
                ))),
            },
        }
    }

    /// Render a numeric answer
    fn number_display_text(&self, answer: &AnswerValue) -> Option<String> {
        answer.as_f64().map(|value| self.formatter().format(value))
    }
}

macro_rules! number_text_input_validator {
    ($($options:ty),+ $(,)?) => {
        $(
            impl TextInputValidator for $options {
                fn validate_text(&self, text: Option<&str>) -> InputResult<Option<AnswerValue>> {
                    self.validate_number_text(text)
                }

                fn validate_answer(&self, answer: Option<&AnswerValue>) -> InputResult<Option<AnswerValue>> {
                    self.validate_number_answer(answer)
                }

                fn display_text(&self, answer: &AnswerValue) -> Option<String> {
                    self.number_display_text(answer)
                }
            }
        )+
    };
}

number_text_input_validator!(IntegerFormatOptions, DoubleFormatOptions, YearFormatOptions);

/// Truncate to a stored whole number
///
/// Values outside the `i64` range are rejected rather than saturated.
#[allow(clippy::cast_possible_truncation)]
fn whole_number(value: f64, messages: &InvalidMessages) -> InputResult<AnswerValue> {
    // 2^63, the first value past i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let whole = value.trunc();
    if !(-LIMIT..LIMIT).contains(&whole) {
        return Err(InputError::NotANumber {
            text: value.to_string(),
            message: messages.invalid().to_string(),
        });
    }
    Ok(AnswerValue::Integer(whole as i64))
}

fn default_grouping() -> bool {
    true
}

fn default_fraction_digits() -> usize {
    2
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(value: &bool) -> bool {
    *value
}

/// Whole number entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegerFormatOptions {
    /// Presentation style
    #[serde(default)]
    pub number_style: NumberFormatStyle,
    /// Whether grouping separators are written
    #[serde(default = "default_grouping", skip_serializing_if = "is_true")]
    pub uses_grouping_separator: bool,
    /// Inclusive minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<i64>,
    /// Inclusive maximum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<i64>,
    /// Step between selectable values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_interval: Option<i64>,
    /// Participant-facing messages
    #[serde(flatten)]
    pub messages: InvalidMessages,
}

impl Default for IntegerFormatOptions {
    fn default() -> Self {
        Self {
            number_style: NumberFormatStyle::None,
            uses_grouping_separator: true,
            minimum_value: None,
            maximum_value: None,
            step_interval: None,
            messages: InvalidMessages::default(),
        }
    }
}

impl IntegerFormatOptions {
    /// Create options without bounds
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive bounds
    #[inline]
    #[must_use]
    pub fn with_range(mut self, minimum: Option<i64>, maximum: Option<i64>) -> Self {
        self.minimum_value = minimum;
        self.maximum_value = maximum;
        self
    }

    /// Set the presentation style
    #[inline]
    #[must_use]
    pub fn with_style(mut self, style: NumberFormatStyle) -> Self {
        self.number_style = style;
        self
    }

    /// Set the participant-facing messages
    #[inline]
    #[must_use]
    pub fn with_messages(mut self, messages: InvalidMessages) -> Self {
        self.messages = messages;
        self
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
impl NumberValidator for IntegerFormatOptions {
    fn formatter(&self) -> NumberFormatter {
        NumberFormatter::new(self.number_style)
            .with_grouping(self.uses_grouping_separator)
            .with_maximum_fraction_digits(0)
    }

    fn bounds(&self) -> (Option<f64>, Option<f64>) {
        (
            self.minimum_value.map(|value| value as f64),
            self.maximum_value.map(|value| value as f64),
        )
    }

    fn messages(&self) -> &InvalidMessages {
        &self.messages
    }

    fn convert(&self, value: f64) -> InputResult<AnswerValue> {
        whole_number(value, &self.messages)
    }

    fn exact_integer(&self, value: i64) -> Option<AnswerValue> {
        matches!(self.number_style, NumberFormatStyle::None | NumberFormatStyle::Decimal)
            .then_some(AnswerValue::Integer(value))
    }
}

/// Decimal number entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoubleFormatOptions {
    /// Presentation style
    #[serde(default)]
    pub number_style: NumberFormatStyle,
    /// Whether grouping separators are written
    #[serde(default = "default_grouping", skip_serializing_if = "is_true")]
    pub uses_grouping_separator: bool,
    /// Maximum fraction digits written
    #[serde(default = "default_fraction_digits")]
    pub maximum_fraction_digits: usize,
    /// Inclusive minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<f64>,
    /// Inclusive maximum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<f64>,
    /// Step between selectable values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_interval: Option<f64>,
    /// Participant-facing messages
    #[serde(flatten)]
    pub messages: InvalidMessages,
}

impl Default for DoubleFormatOptions {
    fn default() -> Self {
        Self {
            number_style: NumberFormatStyle::None,
            uses_grouping_separator: true,
            maximum_fraction_digits: 2,
            minimum_value: None,
            maximum_value: None,
            step_interval: None,
            messages: InvalidMessages::default(),
        }
    }
}

impl DoubleFormatOptions {
    /// Create options without bounds
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive bounds
    #[inline]
    #[must_use]
    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum_value = minimum;
        self.maximum_value = maximum;
        self
    }

    /// Set the presentation style
    #[inline]
    #[must_use]
    pub fn with_style(mut self, style: NumberFormatStyle) -> Self {
        self.number_style = style;
        self
    }

    /// Set the maximum fraction digits
    #[inline]
    #[must_use]
    pub fn with_maximum_fraction_digits(mut self, digits: usize) -> Self {
        self.maximum_fraction_digits = digits;
        self
    }
}

impl NumberValidator for DoubleFormatOptions {
    fn formatter(&self) -> NumberFormatter {
        NumberFormatter::new(self.number_style)
            .with_grouping(self.uses_grouping_separator)
            .with_maximum_fraction_digits(self.maximum_fraction_digits)
    }

    fn bounds(&self) -> (Option<f64>, Option<f64>) {
        (self.minimum_value, self.maximum_value)
    }

    fn messages(&self) -> &InvalidMessages {
        &self.messages
    }

    fn convert(&self, value: f64) -> InputResult<AnswerValue> {
        Ok(AnswerValue::Number(value))
    }
}

/// Year entry, optionally limited relative to the current year
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearFormatOptions {
    /// Whether years after the current one are accepted (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_future: Option<bool>,
    /// Whether years before the current one are accepted (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_past: Option<bool>,
    /// Explicit earliest year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_year: Option<i32>,
    /// Explicit latest year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_year: Option<i32>,
    /// Participant-facing messages
    #[serde(flatten)]
    pub messages: InvalidMessages,
}

impl YearFormatOptions {
    /// Create options accepting any year
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds relative to the given current year
    ///
    /// Explicit years win over the past/future flags.
    #[must_use]
    pub fn bounds_in_year(&self, current_year: i32) -> (Option<i32>, Option<i32>) {
        let minimum = self
            .minimum_year
            .or_else(|| (!self.allow_past.unwrap_or(true)).then_some(current_year));
        let maximum = self
            .maximum_year
            .or_else(|| (!self.allow_future.unwrap_or(true)).then_some(current_year));
        (minimum, maximum)
    }
}

impl NumberValidator for YearFormatOptions {
    fn formatter(&self) -> NumberFormatter {
        NumberFormatter::new(NumberFormatStyle::None)
            .with_grouping(false)
            .with_maximum_fraction_digits(0)
    }

    fn bounds(&self) -> (Option<f64>, Option<f64>) {
        let (minimum, maximum) = self.bounds_in_year(chrono::Utc::now().year());
        (minimum.map(f64::from), maximum.map(f64::from))
    }

    fn messages(&self) -> &InvalidMessages {
        &self.messages
    }

    fn convert(&self, value: f64) -> InputResult<AnswerValue> {
        whole_number(value, &self.messages)
    }

    fn exact_integer(&self, value: i64) -> Option<AnswerValue> {
        Some(AnswerValue::Integer(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn zero_to_ten() -> IntegerFormatOptions {
        IntegerFormatOptions::new().with_range(Some(0), Some(10))
    }

    #[test]
    fn integer_within_range() {
        assert_eq!(
            zero_to_ten().validate_text(Some("5")).unwrap(),
            Some(AnswerValue::Integer(5))
        );
    }

    #[test]
    fn integer_above_maximum() {
        let err = zero_to_ten().validate_text(Some("15")).unwrap_err();
        assert!(matches!(err, InputError::AboveMaximum { .. }));
        assert_eq!(err.message(), DEFAULT_INVALID_NUMBER_MESSAGE);
    }

    #[test]
    fn integer_below_minimum_uses_custom_message() {
        let options = zero_to_ten().with_messages(InvalidMessages {
            min_invalid_message: Some("Too low".to_string()),
            ..InvalidMessages::default()
        });
        let err = options.validate_text(Some("-1")).unwrap_err();
        assert_eq!(err.message(), "Too low");
    }

    #[test]
    fn integer_out_of_storage_range_is_not_a_number() {
        let err = IntegerFormatOptions::new()
            .validate_text(Some("99999999999999999999"))
            .unwrap_err();
        assert!(matches!(err, InputError::NotANumber { .. }));
        assert!(IntegerFormatOptions::new().validate_text(Some("-99999999999999999999")).is_err());
    }

    #[test]
    fn large_integers_are_stored_exactly() {
        let options = IntegerFormatOptions::new();
        assert_eq!(
            options.validate_text(Some("9007199254740993")).unwrap(),
            Some(AnswerValue::Integer(9_007_199_254_740_993))
        );
        assert_eq!(
            options.validate_text(Some("9223372036854775807")).unwrap(),
            Some(AnswerValue::Integer(i64::MAX))
        );
        assert_eq!(
            options
                .validate_answer(Some(&AnswerValue::Integer(9_007_199_254_740_993)))
                .unwrap(),
            Some(AnswerValue::Integer(9_007_199_254_740_993))
        );
    }

    #[test]
    fn exact_integers_still_respect_bounds() {
        let err = zero_to_ten().validate_text(Some("11")).unwrap_err();
        assert!(matches!(err, InputError::AboveMaximum { .. }));
        assert!(zero_to_ten()
            .validate_answer(Some(&AnswerValue::Integer(-1)))
            .is_err());
    }

    #[test]
    fn empty_text_with_bounds_is_not_a_number() {
        let err = zero_to_ten().validate_text(Some("")).unwrap_err();
        assert!(matches!(err, InputError::NotANumber { .. }));
        assert!(zero_to_ten().validate_text(None).is_err());
    }

    #[test]
    fn empty_text_without_bounds_is_no_answer() {
        assert_eq!(IntegerFormatOptions::new().validate_text(Some("  ")).unwrap(), None);
    }

    #[test]
    fn garbage_is_not_a_number() {
        let err = IntegerFormatOptions::new().validate_text(Some("five-ish")).unwrap_err();
        assert!(matches!(err, InputError::NotANumber { .. }));
    }

    #[test]
    fn integer_truncates_fraction() {
        assert_eq!(
            IntegerFormatOptions::new().validate_text(Some("7.9")).unwrap(),
            Some(AnswerValue::Integer(7))
        );
    }

    #[test]
    fn answers_of_other_types_are_rejected() {
        let err = zero_to_ten()
            .validate_answer(Some(&AnswerValue::Boolean(true)))
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidType { .. }));
    }

    #[test]
    fn double_display_rounds_to_fraction_digits() {
        let options = DoubleFormatOptions::new();
        assert_eq!(options.display_text(&AnswerValue::Number(3.14159)).unwrap(), "3.14");
        assert_eq!(options.display_text(&AnswerValue::Number(2.0)).unwrap(), "2");
    }

    #[test]
    fn decimal_grouping_round_trip() {
        let formatter = NumberFormatter::new(NumberFormatStyle::Decimal);
        assert_eq!(formatter.format(1_234_567.5), "1,234,567.5");
        assert_eq!(formatter.parse("1,234,567.5"), Some(1_234_567.5));
        assert_eq!(
            formatter.with_grouping(false).format(1_234_567.5),
            "1234567.5"
        );
    }

    #[test]
    fn currency_and_percent() {
        let currency = NumberFormatter::new(NumberFormatStyle::Currency);
        assert_eq!(currency.format(-1234.5), "-$1,234.50");
        assert_eq!(currency.parse("-$1,234.50"), Some(-1234.5));

        let percent = NumberFormatter::new(NumberFormatStyle::Percent);
        assert_eq!(percent.format(0.25), "25%");
        assert_eq!(percent.parse("25%"), Some(0.25));
    }

    #[test]
    fn scientific_notation() {
        let formatter = NumberFormatter::new(NumberFormatStyle::Scientific);
        assert_eq!(formatter.format(1500.0), "1.5E3");
        assert_eq!(formatter.format(0.0), "0E0");
        assert_eq!(formatter.parse("1.5E3"), Some(1500.0));
    }

    #[test]
    fn spelled_out_numbers() {
        let formatter = NumberFormatter::new(NumberFormatStyle::SpellOut);
        assert_eq!(formatter.format(21.0), "twenty-one");
        assert_eq!(formatter.format(1105.0), "one thousand one hundred five");
        assert_eq!(formatter.format(-3.5), "minus three point five");
        assert_eq!(formatter.parse("one thousand one hundred five"), Some(1105.0));
        assert_eq!(formatter.parse("minus three point five"), Some(-3.5));
        assert_eq!(formatter.parse("thousand"), None);
    }

    #[test]
    fn ordinal_suffixes() {
        let formatter = NumberFormatter::new(NumberFormatStyle::Ordinal);
        let rendered: Vec<String> = [1.0, 2.0, 3.0, 4.0, 11.0, 12.0, 13.0, 21.0, 112.0]
            .iter()
            .map(|value| formatter.format(*value))
            .collect();
        assert_eq!(
            rendered,
            vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "112th"]
        );
        assert_eq!(formatter.parse("22nd"), Some(22.0));
    }

    #[test]
    fn year_bounds_follow_flags() {
        let options = YearFormatOptions {
            allow_future: Some(false),
            ..YearFormatOptions::default()
        };
        assert_eq!(options.bounds_in_year(2020), (None, Some(2020)));

        let explicit = YearFormatOptions {
            allow_past: Some(false),
            minimum_year: Some(1900),
            ..YearFormatOptions::default()
        };
        assert_eq!(explicit.bounds_in_year(2020), (Some(1900), None));
    }

    #[test]
    fn year_rejects_future_when_disallowed() {
        let options = YearFormatOptions {
            allow_future: Some(false),
            ..YearFormatOptions::default()
        };
        let next_year = chrono::Utc::now().year() + 1;
        let err = options.validate_text(Some(&next_year.to_string())).unwrap_err();
        assert!(matches!(err, InputError::AboveMaximum { .. }));
        assert_eq!(options.display_text(&AnswerValue::Integer(1999)).unwrap(), "1999");
    }

    #[test]
    fn options_decode_with_defaults() {
        let options: IntegerFormatOptions = serde_json::from_str(
            r#"{"numberStyle": "decimal", "minimumValue": 0, "maximumValue": 10, "maxInvalidMessage": "Too many"}"#,
        )
        .unwrap();
        assert!(options.uses_grouping_separator);
        assert_eq!(options.number_style, NumberFormatStyle::Decimal);
        assert_eq!(options.messages.above_maximum(), "Too many");

        let double: DoubleFormatOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(double.maximum_fraction_digits, 2);
    }
}
