//! 42-cell month grid.
//!
//! Rows start on Sunday. The grid opens with the tail of the previous month,
//! lists every day of the target month, and is padded with the head of the
//! next month so every month renders as exactly six weeks.

use chrono::{Datelike, NaiveDate};

use crate::{
    models::{
        calendar::{CalendarDay, MonthRef},
        schedule::ScheduleSlot,
    },
    services::orders::OrderCounts,
};

pub const GRID_CELLS: usize = 42;

pub fn days_in_month(month: MonthRef) -> u32 {
    month.last_day().day()
}

/// Weekday of the 1st, 0 = Sunday.
pub fn first_weekday(month: MonthRef) -> u32 {
    month.first_day().weekday().num_days_from_sunday()
}

/// Builds the grid for `month` from slots already fetched for it.
///
/// `orders` sums the counts of every slot on the date. Availability and
/// capacity come from the first slot of the date in `slots` order.
/// `selected_day` only marks a cell of `month` itself.
pub fn build_calendar_grid(
    month: MonthRef,
    slots: &[ScheduleSlot],
    counts: &OrderCounts,
    today: NaiveDate,
    selected_day: Option<u32>,
) -> Vec<CalendarDay> {
    let mut days = Vec::with_capacity(GRID_CELLS);

    let leading = first_weekday(month);
    let prev_len = days_in_month(month.prev());
    for offset in (0..leading).rev() {
        days.push(CalendarDay::filler(prev_len - offset, true));
    }

    for day in 1..=days_in_month(month) {
        let Some(date) = month.day(day) else { continue };
        let mut on_date = slots.iter().filter(|s| s.schedule_date == date).peekable();
        let first = on_date.peek().map(|s| (s.is_available, s.max_orders));
        let orders = on_date
            .map(|s| counts.get(&s.schedule_id).copied().unwrap_or(0))
            .sum::<i64>();

        days.push(CalendarDay {
            date: day,
            orders,
            is_available: first.map(|(available, _)| available),
            max_orders: first.map(|(_, max)| max),
            is_today: date == today,
            is_selected: selected_day == Some(day),
            is_past_month: false,
            is_future_month: false,
        });
    }

    let trailing = GRID_CELLS - days.len();
    for day in 1..=trailing as u32 {
        days.push(CalendarDay::filler(day, false));
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn slot(d: NaiveDate, hour: u32, available: bool, max: i32) -> ScheduleSlot {
        ScheduleSlot {
            schedule_id: Uuid::new_v4(),
            schedule_date: d,
            schedule_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            max_orders: max,
            is_available: available,
        }
    }

    #[test]
    fn every_month_has_42_cells_and_all_real_days() {
        let today = date(2025, 5, 17);
        for year in [2023, 2024, 2025, 2026] {
            for month0 in 0..12 {
                let month = MonthRef::new(year, month0).unwrap();
                let grid = build_calendar_grid(month, &[], &HashMap::new(), today, None);
                assert_eq!(grid.len(), GRID_CELLS, "{month}");
                let real = grid.iter().filter(|d| !d.is_filler()).count() as u32;
                assert_eq!(real, days_in_month(month), "{month}");
            }
        }
    }

    #[test]
    fn may_2025_layout() {
        let month = MonthRef::new(2025, 4).unwrap();
        let grid = build_calendar_grid(month, &[], &HashMap::new(), date(2025, 5, 17), Some(17));

        let leading: Vec<u32> = grid.iter().take_while(|d| d.is_past_month).map(|d| d.date).collect();
        assert_eq!(leading, vec![27, 28, 29, 30]);

        let trailing: Vec<u32> = grid.iter().filter(|d| d.is_future_month).map(|d| d.date).collect();
        assert_eq!(trailing, vec![1, 2, 3, 4, 5, 6, 7]);

        let today: Vec<u32> = grid.iter().filter(|d| d.is_today).map(|d| d.date).collect();
        assert_eq!(today, vec![17]);
    }

    #[test]
    fn february_starting_on_sunday_needs_two_filler_weeks() {
        // February 2026 has 28 days and starts on a Sunday.
        let month = MonthRef::new(2026, 1).unwrap();
        assert_eq!(first_weekday(month), 0);
        let grid = build_calendar_grid(month, &[], &HashMap::new(), date(2026, 3, 1), None);
        assert!(!grid[0].is_filler());
        assert_eq!(grid.iter().filter(|d| d.is_future_month).count(), 14);
    }

    #[test]
    fn january_fillers_come_from_december() {
        // January 2025 starts on a Wednesday.
        let month = MonthRef::new(2025, 0).unwrap();
        let grid = build_calendar_grid(month, &[], &HashMap::new(), date(2025, 1, 1), None);
        let leading: Vec<u32> = grid.iter().take_while(|d| d.is_past_month).map(|d| d.date).collect();
        assert_eq!(leading, vec![29, 30, 31]);
    }

    #[test]
    fn selection_never_marks_filler_cells() {
        let month = MonthRef::new(2025, 4).unwrap();
        for selected in 1..=31 {
            let grid =
                build_calendar_grid(month, &[], &HashMap::new(), date(2024, 1, 1), Some(selected));
            assert!(grid.iter().filter(|d| d.is_selected).all(|d| !d.is_filler()));
            assert_eq!(grid.iter().filter(|d| d.is_selected).count(), 1);
        }
    }

    #[test]
    fn today_outside_month_marks_nothing() {
        let month = MonthRef::new(2025, 4).unwrap();
        let grid = build_calendar_grid(month, &[], &HashMap::new(), date(2025, 6, 3), None);
        assert!(grid.iter().all(|d| !d.is_today));
    }

    #[test]
    fn orders_sum_and_first_slot_wins() {
        let d = date(2025, 5, 17);
        let a = slot(d, 10, false, 12);
        let b = slot(d, 14, true, 40);
        let mut counts = HashMap::new();
        counts.insert(a.schedule_id, 3);
        counts.insert(b.schedule_id, 5);

        let month = MonthRef::new(2025, 4).unwrap();
        let grid = build_calendar_grid(month, &[a, b], &counts, date(2025, 5, 1), None);
        let cell = grid.iter().find(|c| !c.is_filler() && c.date == 17).unwrap();
        assert_eq!(cell.orders, 8);
        assert_eq!(cell.is_available, Some(false));
        assert_eq!(cell.max_orders, Some(12));

        let empty = grid.iter().find(|c| !c.is_filler() && c.date == 18).unwrap();
        assert_eq!(empty.orders, 0);
        assert_eq!(empty.is_available, None);
    }
}
