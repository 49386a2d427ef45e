//! Candidate or scheduled time slot for a game session.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// A date, start time, optional end time and location.
///
/// Times are local wall-clock times at minute precision. An end time at or
/// before the start falls on the following day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    date: NaiveDate,
    start: NaiveTime,
    end: Option<NaiveTime>,
    location: String,
}

impl TimeSlot {
    /// Create a slot; seconds are dropped from both times.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the end time equals the start.
    pub fn new(
        date: NaiveDate,
        start: NaiveTime,
        end: Option<NaiveTime>,
        location: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let start = truncate_to_minute(start);
        let end = end.map(truncate_to_minute);
        if let Some(end) = end {
            if end == start {
                return Err(DomainError::validation(format!(
                    "End time {} must differ from start time {}",
                    end.format(TIME_FORMAT),
                    start.format(TIME_FORMAT)
                )));
            }
        }
        Ok(Self {
            date,
            start,
            end,
            location: location.into().trim().to_string(),
        })
    }

    /// Parse from form input: `YYYY-MM-DD`, `HH:MM`, optional `HH:MM`, location.
    pub fn parse(
        date: &str,
        start: &str,
        end: Option<&str>,
        location: &str,
    ) -> Result<Self, DomainError> {
        let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .map_err(|_| DomainError::parse(format!("Invalid date '{}', expected YYYY-MM-DD", date)))?;
        let start = parse_time(start)?;
        let end = end
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_time)
            .transpose()?;
        Self::new(date, start, end, location)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> Option<NaiveTime> {
        self.end
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Concrete date-time derived from the date and start fields.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    /// End date-time, rolled over to the next day for overnight slots.
    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        let end = self.end?;
        let day = if end < self.start {
            self.date.checked_add_days(Days::new(1))?
        } else {
            self.date
        };
        Some(day.and_time(end))
    }

    pub fn is_overnight(&self) -> bool {
        self.ends_at().is_some_and(|end| end.date() > self.date)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.date.format(DATE_FORMAT),
            self.start.format(TIME_FORMAT)
        )?;
        if let Some(end) = self.end {
            write!(f, "-{}", end.format(TIME_FORMAT))?;
            if self.is_overnight() {
                write!(f, " (+1 day)")?;
            }
        }
        if !self.location.is_empty() {
            write!(f, " @ {}", self.location)?;
        }
        Ok(())
    }
}

fn parse_time(input: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map_err(|_| DomainError::parse(format!("Invalid time '{}', expected HH:MM", input)))
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let slot = TimeSlot::parse("2026-11-07", "18:30", Some("22:00"), " The Prancing Pony ")
            .expect("valid slot");
        assert_eq!(slot.location(), "The Prancing Pony");
        assert_eq!(slot.to_string(), "2026-11-07 18:30-22:00 @ The Prancing Pony");
        assert_eq!(
            slot.starts_at(),
            NaiveDate::from_ymd_opt(2026, 11, 7)
                .and_then(|d| d.and_hms_opt(18, 30, 0))
                .expect("valid datetime")
        );
    }

    #[test]
    fn empty_end_is_none() {
        let slot = TimeSlot::parse("2026-11-07", "18:30", Some(""), "Discord").expect("valid");
        assert_eq!(slot.end(), None);
    }

    #[test]
    fn zero_length_slot_rejected() {
        let result = TimeSlot::parse("2026-11-07", "18:30", Some("18:30"), "Discord");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn end_before_start_runs_past_midnight() {
        let slot = TimeSlot::parse("2026-11-07", "21:00", Some("01:00"), "Game Store")
            .expect("overnight slot");
        assert!(slot.is_overnight());
        assert_eq!(
            slot.ends_at(),
            NaiveDate::from_ymd_opt(2026, 11, 8).and_then(|d| d.and_hms_opt(1, 0, 0))
        );
        assert_eq!(slot.to_string(), "2026-11-07 21:00-01:00 (+1 day) @ Game Store");

        let evening = TimeSlot::parse("2026-11-07", "18:00", Some("22:00"), "x").expect("valid");
        assert!(!evening.is_overnight());
        assert_eq!(
            evening.ends_at(),
            NaiveDate::from_ymd_opt(2026, 11, 7).and_then(|d| d.and_hms_opt(22, 0, 0))
        );
    }

    #[test]
    fn bad_date_rejected() {
        assert!(matches!(
            TimeSlot::parse("11/07/2026", "18:30", None, "x"),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn seconds_are_dropped() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).expect("valid date");
        let start = NaiveTime::from_hms_opt(19, 5, 42).expect("valid time");
        let slot = TimeSlot::new(date, start, None, "Online").expect("valid");
        assert_eq!(slot.start(), NaiveTime::from_hms_opt(19, 5, 0).expect("valid time"));
    }
}
