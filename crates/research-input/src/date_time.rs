//! Date and time entry validation

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::answer::AnswerValue;
use crate::date_coder::{PatternFormat, TIMESTAMP_PATTERN};
use crate::error::{InputError, InputResult};
use crate::validator::TextInputValidator;

/// Which parts of a date the picker asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatePickerMode {
    /// Calendar date only
    Date,
    /// Time of day only
    Time,
    /// Date and time of day
    #[default]
    DateAndTime,
}

impl DatePickerMode {
    /// Pattern shown to the participant
    #[must_use]
    pub fn display_pattern(self) -> &'static str {
        match self {
            Self::Date => "MM/dd/yyyy",
            Self::Time => "hh:mm a",
            Self::DateAndTime => "MM/dd/yyyy hh:mm a",
        }
    }

    /// Pattern used when the answer is stored as text
    #[must_use]
    pub fn coding_pattern(self) -> &'static str {
        match self {
            Self::Date => "yyyy-MM-dd",
            Self::Time => "HH:mm:ss",
            Self::DateAndTime => TIMESTAMP_PATTERN,
        }
    }
}

/// Inclusive range of accepted dates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Earliest accepted date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_date: Option<DateTime<FixedOffset>>,
    /// Latest accepted date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_date: Option<DateTime<FixedOffset>>,
}

impl DateRange {
    /// Create a range from optional bounds
    #[inline]
    #[must_use]
    pub fn new(
        minimum_date: Option<DateTime<FixedOffset>>,
        maximum_date: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            minimum_date,
            maximum_date,
        }
    }

    /// Check a date against the range
    ///
    /// # Errors
    /// `BeforeMinimumDate` or `AfterMaximumDate`
    pub fn check(&self, value: &DateTime<FixedOffset>) -> InputResult<()> {
        if let Some(minimum) = self.minimum_date.filter(|minimum| value < minimum) {
            return Err(InputError::BeforeMinimumDate {
                minimum,
                value: *value,
            });
        }
        if let Some(maximum) = self.maximum_date.filter(|maximum| value > maximum) {
            return Err(InputError::AfterMaximumDate {
                maximum,
                value: *value,
            });
        }
        Ok(())
    }
}

/// Validates dates typed in the picker's display format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeValidator {
    picker_mode: DatePickerMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<DateRange>,
    /// Offset east of UTC, in seconds, that displayed text is read and written in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    utc_offset_seconds: Option<i32>,
}

impl DateTimeValidator {
    /// Create a validator without a range
    #[inline]
    #[must_use]
    pub fn new(picker_mode: DatePickerMode) -> Self {
        Self {
            picker_mode,
            range: None,
            utc_offset_seconds: None,
        }
    }

    /// Read and write displayed text at a fixed offset from UTC
    #[inline]
    #[must_use]
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset_seconds = Some(offset.local_minus_utc());
        self
    }

    /// Offset displayed text is read and written in
    ///
    /// UTC unless configured; an out of range configured offset also reads as UTC.
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_seconds
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Limit accepted dates to a range
    #[inline]
    #[must_use]
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Picker mode
    #[inline]
    #[must_use]
    pub fn picker_mode(&self) -> DatePickerMode {
        self.picker_mode
    }

    /// Accepted range, if any
    #[inline]
    #[must_use]
    pub fn range(&self) -> Option<&DateRange> {
        self.range.as_ref()
    }

    /// Formatter for text shown to the participant
    ///
    /// # Errors
    /// `Coder` if the display pattern cannot be translated
    pub fn display_format(&self) -> InputResult<PatternFormat> {
        Ok(PatternFormat::parse(self.picker_mode.display_pattern())?)
    }

    /// Formatter for stored text answers
    ///
    /// # Errors
    /// `Coder` if the coding pattern cannot be translated
    pub fn coding_format(&self) -> InputResult<PatternFormat> {
        Ok(PatternFormat::parse(self.picker_mode.coding_pattern())?)
    }

    fn check(&self, value: DateTime<FixedOffset>) -> InputResult<Option<AnswerValue>> {
        if let Some(range) = &self.range {
            range.check(&value)?;
        }
        Ok(Some(AnswerValue::Date(value)))
    }

    /// Read displayed text as wall-clock time at the display offset
    fn read_text(&self, text: &str, format: &PatternFormat) -> InputResult<DateTime<FixedOffset>> {
        let parsed = format
            .parse_date(text)
            .ok_or_else(|| InputError::InvalidFormat {
                text: text.to_string(),
                format: format.pattern().to_string(),
            })?;
        Ok(self
            .utc_offset()
            .from_local_datetime(&parsed.naive_local())
            .single()
            .unwrap_or(parsed))
    }
}

impl TextInputValidator for DateTimeValidator {
    fn validate_text(&self, text: Option<&str>) -> InputResult<Option<AnswerValue>> {
        let Some(text) = text else {
            return Ok(None);
        };
        let date = self.read_text(text, &self.display_format()?)?;
        self.check(date)
    }

    fn validate_answer(&self, answer: Option<&AnswerValue>) -> InputResult<Option<AnswerValue>> {
        match answer {
            None => Ok(None),
            Some(AnswerValue::Date(date)) => self.check(*date),
            Some(AnswerValue::String(text)) => {
                let date = match self.coding_format()?.parse_date(text) {
                    Some(date) => date,
                    None => self.read_text(text, &self.display_format()?)?,
                };
                self.check(date)
            }
            Some(other) => Err(InputError::invalid_type(format!(
                "{} is not supported for {:?} entry",
                other.kind(),
                self.picker_mode
            ))),
        }
    }

    fn display_text(&self, answer: &AnswerValue) -> Option<String> {
        let display = self.display_format().ok()?;
        let date = match answer {
            AnswerValue::Date(date) => *date,
            AnswerValue::String(text) => self.coding_format().ok()?.parse_date(text)?,
            _ => return None,
        };
        Some(display.format(&date.with_timezone(&self.utc_offset())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    fn utc(year: i32, month: u32, day: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(year, month, day, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn reads_display_date() {
        let validator = DateTimeValidator::new(DatePickerMode::Date);
        let answer = validator.validate_text(Some("10/16/2017")).unwrap().unwrap();
        assert_eq!(answer, AnswerValue::Date(utc(2017, 10, 16)));
        assert_eq!(validator.display_text(&answer).unwrap(), "10/16/2017");
    }

    #[test]
    fn display_keeps_the_instant_of_offset_answers() {
        let offset = FixedOffset::west_opt(2 * 3600 + 1800).unwrap();
        let evening = offset.with_ymd_and_hms(2017, 10, 16, 22, 28, 0).unwrap();
        let answer = AnswerValue::Date(evening);

        let validator = DateTimeValidator::new(DatePickerMode::DateAndTime);
        let text = validator.display_text(&answer).unwrap();
        assert_eq!(text, "10/17/2017 12:58 AM");
        let read = validator.validate_text(Some(&text)).unwrap().unwrap();
        assert_eq!(read.as_date().map(DateTime::timestamp), Some(evening.timestamp()));

        let local = validator.with_utc_offset(offset);
        let text = local.display_text(&answer).unwrap();
        assert_eq!(text, "10/16/2017 10:28 PM");
        assert_eq!(local.validate_text(Some(&text)).unwrap(), Some(answer));
    }

    #[test]
    fn reads_display_time() {
        let validator = DateTimeValidator::new(DatePickerMode::Time);
        let answer = validator.validate_text(Some("09:15 PM")).unwrap().unwrap();
        let date = answer.as_date().unwrap();
        assert_eq!((date.hour(), date.minute()), (21, 15));
    }

    #[test]
    fn unreadable_text_is_invalid_format() {
        let validator = DateTimeValidator::new(DatePickerMode::Date);
        let err = validator.validate_text(Some("next tuesday")).unwrap_err();
        assert_eq!(
            err,
            InputError::InvalidFormat {
                text: "next tuesday".to_string(),
                format: "MM/dd/yyyy".to_string(),
            }
        );
    }

    #[test]
    fn range_is_enforced() {
        let validator = DateTimeValidator::new(DatePickerMode::Date)
            .with_range(DateRange::new(Some(utc(2000, 1, 1)), Some(utc(2010, 12, 31))));

        assert!(matches!(
            validator.validate_text(Some("12/31/1999")),
            Err(InputError::BeforeMinimumDate { .. })
        ));
        assert!(matches!(
            validator.validate_text(Some("01/01/2011")),
            Err(InputError::AfterMaximumDate { .. })
        ));
        assert!(validator.validate_text(Some("06/15/2005")).is_ok());
    }

    #[test]
    fn stored_text_answers_use_coding_format() {
        let validator = DateTimeValidator::new(DatePickerMode::Date);
        let answer = validator
            .validate_answer(Some(&AnswerValue::from("2017-10-16")))
            .unwrap()
            .unwrap();
        assert_eq!(answer.as_date().unwrap().year(), 2017);
        assert_eq!(
            validator.display_text(&AnswerValue::from("2017-10-16")).unwrap(),
            "10/16/2017"
        );
    }

    #[test]
    fn numbers_are_not_dates() {
        let validator = DateTimeValidator::new(DatePickerMode::DateAndTime);
        assert!(matches!(
            validator.validate_answer(Some(&AnswerValue::Integer(3))),
            Err(InputError::InvalidType { .. })
        ));
    }

    #[test]
    fn decodes_from_document() {
        let validator: DateTimeValidator = serde_json::from_str(
            r#"{"pickerMode": "date", "range": {"minimumDate": "2000-01-01T00:00:00+00:00"}}"#,
        )
        .unwrap();
        assert_eq!(validator.picker_mode(), DatePickerMode::Date);
        assert_eq!(validator.range().unwrap().minimum_date, Some(utc(2000, 1, 1)));
    }
}
