//! 24-hour slot times rendered as the 12-hour labels customers and staff see.

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::{
    models::{
        calendar::{Period, TimeSlotView},
        schedule::ScheduleSlot,
    },
    services::orders::OrderCounts,
};

/// Splits a time into its 12-hour display hour and period.
/// 0 → 12 AM, 1–11 → AM, 12 → 12 PM, 13–23 → hour − 12 PM.
pub fn to_12h(time: NaiveTime) -> (u32, Period) {
    match time.hour() {
        0 => (12, Period::Am),
        h @ 1..=11 => (h, Period::Am),
        12 => (12, Period::Pm),
        h => (h - 12, Period::Pm),
    }
}

/// "2:00 PM"
pub fn format_12h(time: NaiveTime) -> String {
    let (hour, period) = to_12h(time);
    format!("{hour}:{:02} {period}", time.minute())
}

/// Inverse of [`format_12h`]. Accepts "2:00 PM", "02:00PM" and "12:30 am".
pub fn parse_12h(display: &str) -> anyhow::Result<NaiveTime> {
    let s = display.trim().to_ascii_uppercase();
    let (clock, period) = if let Some(rest) = s.strip_suffix("AM") {
        (rest.trim(), Period::Am)
    } else if let Some(rest) = s.strip_suffix("PM") {
        (rest.trim(), Period::Pm)
    } else {
        anyhow::bail!("time {display:?} has no AM/PM marker");
    };

    let (h, m) = clock
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("time {display:?} is not h:mm"))?;
    let hour: u32 = h.parse()?;
    let minute: u32 = m.parse()?;
    anyhow::ensure!((1..=12).contains(&hour), "hour out of range in {display:?}");

    let hour24 = to_24h(hour, period);
    NaiveTime::from_hms_opt(hour24, minute, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid time {display:?}"))
}

fn to_24h(hour: u32, period: Period) -> u32 {
    match (hour, period) {
        (12, Period::Am) => 0,
        (12, Period::Pm) => 12,
        (h, Period::Am) => h,
        (h, Period::Pm) => h + 12,
    }
}

/// Time slots of `date`, ascending by time of day.
///
/// Slots sort by the hour rebuilt from the 12-hour label and then by minute,
/// so 12 AM comes first and 12 PM sits between 11 AM and 1 PM.
pub fn build_time_slots(
    date: NaiveDate,
    slots: &[ScheduleSlot],
    counts: &OrderCounts,
) -> Vec<TimeSlotView> {
    let mut views: Vec<TimeSlotView> = slots
        .iter()
        .filter(|s| s.schedule_date == date)
        .map(|s| {
            let (hour, period) = to_12h(s.schedule_time);
            TimeSlotView {
                schedule_id: s.schedule_id,
                time: s.schedule_time,
                display: format_12h(s.schedule_time),
                hour,
                period,
                is_available: s.is_available,
                max_orders: s.max_orders,
                orders: counts.get(&s.schedule_id).copied().unwrap_or(0),
            }
        })
        .collect();

    views.sort_by_key(|v| (to_24h(v.hour, v.period), v.time.minute()));
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn twelve_hour_labels() {
        assert_eq!(format_12h(t(0, 0)), "12:00 AM");
        assert_eq!(format_12h(t(9, 5)), "9:05 AM");
        assert_eq!(format_12h(t(12, 0)), "12:00 PM");
        assert_eq!(format_12h(t(14, 0)), "2:00 PM");
        assert_eq!(format_12h(t(23, 59)), "11:59 PM");
    }

    #[test]
    fn parse_accepts_display_forms() {
        assert_eq!(parse_12h("2:00 PM").unwrap(), t(14, 0));
        assert_eq!(parse_12h("12:30 am").unwrap(), t(0, 30));
        assert_eq!(parse_12h("12:00PM").unwrap(), t(12, 0));
        assert_eq!(parse_12h("09:15 AM").unwrap(), t(9, 15));
        assert!(parse_12h("14:00").is_err());
        assert!(parse_12h("13:00 PM").is_err());
        assert!(parse_12h("2 PM").is_err());
    }

    #[test]
    fn sorted_by_time_of_day_with_minutes() {
        let d = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
        let mk = |time| ScheduleSlot {
            schedule_id: Uuid::new_v4(),
            schedule_date: d,
            schedule_time: time,
            max_orders: 30,
            is_available: true,
        };
        let other_day = ScheduleSlot {
            schedule_date: d.succ_opt().unwrap(),
            ..mk(t(8, 0))
        };
        let slots = vec![mk(t(14, 30)), mk(t(12, 0)), mk(t(9, 0)), mk(t(14, 0)), other_day];

        let labels: Vec<String> = build_time_slots(d, &slots, &HashMap::new())
            .into_iter()
            .map(|v| v.display)
            .collect();
        assert_eq!(labels, vec!["9:00 AM", "12:00 PM", "2:00 PM", "2:30 PM"]);
    }

    #[test]
    fn no_slots_means_empty_list() {
        let d = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
        assert!(build_time_slots(d, &[], &HashMap::new()).is_empty());
    }
}
