//! Date coding derived from format patterns
//!
//! A [`DateCoder`] is built from an LDML-style input pattern such as
//! `"yyyy-MM-dd"` or `"HH:mm"`. The pattern determines which calendar
//! components a participant is asked for, and those components in turn select
//! the canonical pattern used to store the answer.
//!
//! Patterns are read with a fixed `en_US_POSIX`-style locale and the ISO 8601
//! calendar. Fields missing from a partial pattern default to
//! `2000-01-01T00:00:00` and dates without an offset are read as UTC.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoderError;

/// Pattern of the default timestamp coder
pub const TIMESTAMP_PATTERN: &str = "yyyy-MM-dd'T'HH:mm:ss.SSSZZZZZ";

/// Bundled example patterns, one per storage layout family
pub const EXAMPLE_PATTERNS: &[&str] = &[
    TIMESTAMP_PATTERN,
    "yyyy-MM",
    "yyyy-MM-dd",
    "MM-dd",
    "HH:mm:ss",
    "HH:mm",
];

/// Calendar component requested from the participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CalendarComponent {
    /// Four digit year
    Year,
    /// Month of year
    Month,
    /// Day of month
    Day,
    /// Hour of day
    Hour,
    /// Minute of hour
    Minute,
    /// Second of minute
    Second,
    /// Sub-second precision
    Nanosecond,
}

impl Display for CalendarComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Nanosecond => "nanosecond",
        };
        f.write_str(name)
    }
}

/// Derive the calendar components mentioned by a pattern
///
/// The scan is substring based: `yyyy`, `MM`, `dd`, `HH`, `mm`, `ss` and
/// `ss.SSS` each add one component.
///
/// # Errors
/// Returns `NoComponentsDerived` when nothing matches
pub fn derive_components(pattern: &str) -> Result<BTreeSet<CalendarComponent>, CoderError> {
    const MARKERS: &[(&str, CalendarComponent)] = &[
        ("yyyy", CalendarComponent::Year),
        ("MM", CalendarComponent::Month),
        ("dd", CalendarComponent::Day),
        ("HH", CalendarComponent::Hour),
        ("mm", CalendarComponent::Minute),
        ("ss", CalendarComponent::Second),
        ("ss.SSS", CalendarComponent::Nanosecond),
    ];

    let components: BTreeSet<_> = MARKERS
        .iter()
        .filter(|(marker, _)| pattern.contains(marker))
        .map(|(_, component)| *component)
        .collect();

    if components.is_empty() {
        return Err(CoderError::NoComponentsDerived {
            pattern: pattern.to_string(),
        });
    }
    Ok(components)
}

/// Canonical storage pattern for a component set
#[must_use]
pub fn storage_pattern(components: &BTreeSet<CalendarComponent>) -> &'static str {
    use CalendarComponent::{Day, Hour, Minute, Month, Nanosecond, Second, Year};

    let has = |required: &[CalendarComponent]| required.iter().all(|c| components.contains(c));

    if has(&[Year, Month, Day, Hour, Minute]) {
        TIMESTAMP_PATTERN
    } else if has(&[Year, Month, Day]) {
        "yyyy-MM-dd"
    } else if has(&[Year, Month]) {
        "yyyy-MM"
    } else if has(&[Year]) {
        "yyyy"
    } else if has(&[Month, Day]) {
        "MM-dd"
    } else if has(&[Hour, Minute, Second, Nanosecond]) {
        "HH:mm:ss.SSS"
    } else if has(&[Hour, Minute, Second]) {
        "HH:mm:ss"
    } else if has(&[Hour, Minute]) {
        "HH:mm"
    } else {
        TIMESTAMP_PATTERN
    }
}

/// Fields a translated pattern reads, used to fill in parse defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PatternFields {
    year: bool,
    month: bool,
    day: bool,
    hour: bool,
    minute: bool,
    offset: bool,
}

/// An LDML pattern translated to a `chrono` format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFormat {
    pattern: String,
    format: String,
    fields: PatternFields,
}

impl PatternFormat {
    /// Translate an LDML pattern
    ///
    /// # Errors
    /// - `UnsupportedSymbol` for field letters without a translation
    /// - `UnterminatedLiteral` for an unclosed quote
    pub fn parse(pattern: &str) -> Result<Self, CoderError> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut format = String::with_capacity(pattern.len() * 2);
        let mut fields = PatternFields::default();
        let mut index = 0;

        while index < chars.len() {
            let ch = chars[index];

            if ch == '\'' {
                if chars.get(index + 1) == Some(&'\'') {
                    format.push('\'');
                    index += 2;
                    continue;
                }
                let start = index + 1;
                let Some(len) = chars[start..].iter().position(|c| *c == '\'') else {
                    return Err(CoderError::UnterminatedLiteral {
                        pattern: pattern.to_string(),
                    });
                };
                for literal in &chars[start..start + len] {
                    push_literal(&mut format, *literal);
                }
                index = start + len + 1;
                continue;
            }

            if ch == '.' && chars.get(index + 1) == Some(&'S') {
                let run = run_length(&chars, index + 1);
                format.push_str(fraction_spec(run, true));
                index += 1 + run;
                continue;
            }

            if ch.is_ascii_alphabetic() {
                let run = run_length(&chars, index);
                let spec = field_spec(ch, run, &mut fields).ok_or_else(|| {
                    CoderError::UnsupportedSymbol {
                        pattern: pattern.to_string(),
                        symbol: ch.to_string().repeat(run),
                    }
                })?;
                format.push_str(spec);
                index += run;
                continue;
            }

            push_literal(&mut format, ch);
            index += 1;
        }

        Ok(Self {
            pattern: pattern.to_string(),
            format,
            fields,
        })
    }

    /// Source LDML pattern
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Translated `chrono` format string
    #[inline]
    #[must_use]
    pub fn chrono_format(&self) -> &str {
        &self.format
    }

    /// Render a date with this pattern
    #[must_use]
    pub fn format(&self, value: &DateTime<FixedOffset>) -> String {
        value.format(&self.format).to_string()
    }

    /// Read text written with this pattern
    ///
    /// Fields the pattern does not mention take their defaults.
    #[must_use]
    pub fn parse_date(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        let (text, format) = self.with_defaults(text.trim());

        if self.fields.offset {
            DateTime::parse_from_str(&text, &format).ok().or_else(|| {
                let zulu = text.replacen('Z', "+00:00", 1);
                DateTime::parse_from_str(&zulu, &format).ok()
            })
        } else {
            NaiveDateTime::parse_from_str(&text, &format)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        }
    }

    fn with_defaults(&self, text: &str) -> (String, String) {
        let mut text = text.to_string();
        let mut format = self.format.clone();
        let defaults = [
            (self.fields.year, "%Y", "2000"),
            (self.fields.month, "%m", "01"),
            (self.fields.day, "%d", "01"),
            (self.fields.hour, "%H", "00"),
            (self.fields.minute, "%M", "00"),
        ];
        for (present, spec, value) in defaults {
            if !present {
                format.push('|');
                format.push_str(spec);
                text.push('|');
                text.push_str(value);
            }
        }
        (text, format)
    }
}

fn run_length(chars: &[char], start: usize) -> usize {
    let first = chars[start];
    chars[start..].iter().take_while(|c| **c == first).count()
}

fn push_literal(format: &mut String, ch: char) {
    if ch == '%' {
        format.push_str("%%");
    } else {
        format.push(ch);
    }
}

fn fraction_spec(run: usize, dotted: bool) -> &'static str {
    match (run, dotted) {
        (0..=3, true) => "%.3f",
        (4..=6, true) => "%.6f",
        (_, true) => "%.9f",
        (0..=3, false) => "%3f",
        (4..=6, false) => "%6f",
        (_, false) => "%9f",
    }
}

fn field_spec(symbol: char, run: usize, fields: &mut PatternFields) -> Option<&'static str> {
    let spec = match (symbol, run) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M' | 'L', 1) => "%-m",
        ('M' | 'L', 2) => "%m",
        ('M' | 'L', 3) => "%b",
        ('M' | 'L', 4) => "%B",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('H', 1) => "%-H",
        ('H', 2) => "%H",
        ('h', 1) => "%-I",
        ('h', 2) => "%I",
        ('m', 1) => "%-M",
        ('m', 2) => "%M",
        ('s', 1) => "%-S",
        ('s', 2) => "%S",
        ('S', n) => fraction_spec(n, false),
        ('a', 1..=3) => "%p",
        ('E', 1..=3) => "%a",
        ('E', 4) => "%A",
        ('Z', 1..=3) | ('X' | 'x', 1 | 2 | 4) => "%z",
        ('Z', 5) | ('X' | 'x', 3 | 5) => "%:z",
        _ => return None,
    };
    match symbol {
        'y' => fields.year = true,
        'M' | 'L' => fields.month = true,
        'd' => fields.day = true,
        'H' | 'h' => fields.hour = true,
        'm' => fields.minute = true,
        'Z' | 'X' | 'x' => fields.offset = true,
        _ => {}
    }
    Some(spec)
}

/// Date coder derived from an input pattern
///
/// Two coders are equal when they store dates with the same pattern.
#[derive(Debug, Clone)]
pub struct DateCoder {
    input: PatternFormat,
    storage: PatternFormat,
    components: BTreeSet<CalendarComponent>,
}

impl DateCoder {
    /// Build a coder from an input pattern
    ///
    /// # Errors
    /// - `NoComponentsDerived` if the pattern names no calendar component
    /// - translation errors for unsupported pattern symbols
    pub fn new(pattern: &str) -> Result<Self, CoderError> {
        let components = derive_components(pattern)?;
        let input = PatternFormat::parse(pattern)?;
        let storage = PatternFormat::parse(storage_pattern(&components))?;
        Ok(Self {
            input,
            storage,
            components,
        })
    }

    /// Coder for full timestamps
    #[must_use]
    pub fn timestamp() -> Self {
        let components: BTreeSet<_> = [
            CalendarComponent::Year,
            CalendarComponent::Month,
            CalendarComponent::Day,
            CalendarComponent::Hour,
            CalendarComponent::Minute,
            CalendarComponent::Second,
            CalendarComponent::Nanosecond,
        ]
        .into_iter()
        .collect();
        let fields = PatternFields {
            year: true,
            month: true,
            day: true,
            hour: true,
            minute: true,
            offset: true,
        };
        let pattern = PatternFormat {
            pattern: TIMESTAMP_PATTERN.to_string(),
            format: "%Y-%m-%dT%H:%M:%S%.3f%:z".to_string(),
            fields,
        };
        Self {
            input: pattern.clone(),
            storage: pattern,
            components,
        }
    }

    /// Input pattern this coder was built from
    #[inline]
    #[must_use]
    pub fn input_pattern(&self) -> &str {
        self.input.pattern()
    }

    /// Canonical pattern used to store answers
    #[inline]
    #[must_use]
    pub fn storage_pattern(&self) -> &str {
        self.storage.pattern()
    }

    /// Components requested from the participant
    #[inline]
    #[must_use]
    pub fn components(&self) -> &BTreeSet<CalendarComponent> {
        &self.components
    }

    /// Formatter for the input pattern
    #[inline]
    #[must_use]
    pub fn input_format(&self) -> &PatternFormat {
        &self.input
    }

    /// Formatter for the storage pattern
    #[inline]
    #[must_use]
    pub fn storage_format(&self) -> &PatternFormat {
        &self.storage
    }

    /// Encode a date for storage
    #[inline]
    #[must_use]
    pub fn encode(&self, value: &DateTime<FixedOffset>) -> String {
        self.storage.format(value)
    }

    /// Decode a stored date
    ///
    /// Text written with the input pattern is accepted as well.
    #[must_use]
    pub fn decode(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        let decoded = self
            .storage
            .parse_date(text)
            .or_else(|| self.input.parse_date(text));
        if decoded.is_none() {
            tracing::trace!(text, storage = self.storage_pattern(), "date text did not match coder");
        }
        decoded
    }
}

impl Default for DateCoder {
    fn default() -> Self {
        Self::timestamp()
    }
}

impl PartialEq for DateCoder {
    fn eq(&self, other: &Self) -> bool {
        self.storage_pattern() == other.storage_pattern()
    }
}

impl Eq for DateCoder {}

impl Serialize for DateCoder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.input_pattern())
    }
}

impl<'de> Deserialize<'de> for DateCoder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Self::new(&pattern).map_err(D::Error::custom)
    }
}
