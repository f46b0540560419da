//! Monday-first week navigation for the calendar strip.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// One day of a [`Week`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekDay {
    pub date: NaiveDate,
    /// `Mon`, `Tue`, ...
    pub day_name: String,
    pub day_of_month: u32,
    /// `Jan`, `Feb`, ...
    pub month_name: String,
    pub year: i32,
}

impl WeekDay {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            day_name: date.format("%a").to_string(),
            day_of_month: date.day(),
            month_name: date.format("%b").to_string(),
            year: date.year(),
        }
    }

    /// `YYYY-MM-DD`, the form day views are addressed by.
    pub fn slug(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// The Monday-to-Sunday week containing a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Week {
    start: NaiveDate,
}

impl Week {
    pub fn containing(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_monday());
        Self {
            start: date - Duration::days(offset),
        }
    }

    /// The Monday.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The Sunday.
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end()).contains(&date)
    }

    pub fn days(&self) -> Vec<WeekDay> {
        (0..7)
            .map(|i| WeekDay::new(self.start + Duration::days(i)))
            .collect()
    }

    pub fn prev(&self) -> Self {
        Self {
            start: self.start - Duration::days(7),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            start: self.start + Duration::days(7),
        }
    }

    /// `Aug 2025`, or `Jul 2025 – Aug 2025` for a week spanning two months.
    pub fn header(&self) -> String {
        let first = self.start;
        let last = self.end();
        if first.month() == last.month() && first.year() == last.year() {
            first.format("%b %Y").to_string()
        } else {
            format!("{} \u{2013} {}", first.format("%b %Y"), last.format("%b %Y"))
        }
    }
}
