use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use super::wire::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateWindow> {
        if start > end {
            return Err(InvalidDateWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        let start = today
            .checked_sub_signed(Duration::days(days.max(0)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub(crate) fn to_range(self) -> DateRange {
        DateRange {
            start_date: self.start.format("%Y-%m-%d").to_string(),
            end_date: self.end.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for InvalidDateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start date {} is after end date {}", self.start, self.end)
    }
}

impl std::error::Error for InvalidDateWindow {}
