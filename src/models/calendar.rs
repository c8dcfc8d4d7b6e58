use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{order::CustomerOrder, schedule::ScheduleSlot};

pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// A calendar month addressed by year and zero-based month index. Only
/// [`MonthRef::new`] and [`MonthRef::containing`] build one, so `month0` is
/// always in `0..=11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRef {
    year: i32,
    month0: u32,
}

impl MonthRef {
    pub fn new(year: i32, month0: u32) -> anyhow::Result<Self> {
        anyhow::ensure!(month0 <= 11, "month index must be between 0 and 11, got {month0}");
        anyhow::ensure!(
            NaiveDate::from_ymd_opt(year, month0 + 1, 1).is_some(),
            "year {year} is out of range"
        );
        Ok(Self { year, month0 })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES.get(self.month0 as usize).copied().unwrap_or("Unknown")
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, day)
    }

    pub fn next(&self) -> Self {
        if self.month0 == 11 {
            Self { year: self.year + 1, month0: 0 }
        } else {
            Self { year: self.year, month0: self.month0 + 1 }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month0 == 0 {
            Self { year: self.year - 1, month0: 11 }
        } else {
            Self { year: self.year, month0: self.month0 - 1 }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month0
    }
}

impl std::fmt::Display for MonthRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}

/// One cell of the 6x7 month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: u32,
    pub orders: i64,
    /// Taken from the first slot fetched for the date; `None` when the date has no slots.
    pub is_available: Option<bool>,
    pub max_orders: Option<i32>,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_past_month: bool,
    pub is_future_month: bool,
}

impl CalendarDay {
    pub fn filler(date: u32, past: bool) -> Self {
        Self {
            date,
            orders: 0,
            is_available: None,
            max_orders: None,
            is_today: false,
            is_selected: false,
            is_past_month: past,
            is_future_month: !past,
        }
    }

    pub fn is_filler(&self) -> bool {
        self.is_past_month || self.is_future_month
    }
}

/// A single time slot of the selected day, as shown in the side panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlotView {
    pub schedule_id: Uuid,
    pub time: NaiveTime,
    /// "2:00 PM"
    pub display: String,
    pub hour: u32,
    pub period: Period,
    pub is_available: bool,
    pub max_orders: i32,
    pub orders: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Am => write!(f, "AM"),
            Period::Pm => write!(f, "PM"),
        }
    }
}

/// Everything a Schedule screen needs to render one month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthSnapshot {
    pub month: MonthRef,
    pub label: String,
    pub days: Vec<CalendarDay>,
    pub slots: Vec<ScheduleSlot>,
}

/// Side panel content for one selected date.
#[derive(Debug, Clone, Serialize)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub time_slots: Vec<TimeSlotView>,
    pub orders: Vec<CustomerOrder>,
    /// The order limit shown in the capacity input (first slot of the day).
    pub order_limit: Option<i32>,
    pub is_available: Option<bool>,
}

/// Query params for GET /schedule/calendar. `month` is zero-based.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
    pub selected: Option<u32>,
}

/// Query params for GET /schedule/day.
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_index_is_validated_on_construction() {
        assert!(MonthRef::new(2025, 12).is_err());

        let december = MonthRef::new(2025, 11).unwrap();
        assert_eq!(december.to_string(), "December 2025");
        assert_eq!(december.next().to_string(), "January 2026");
        assert_eq!((december.year(), december.month0()), (2025, 11));
    }
}
