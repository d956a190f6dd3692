//! Countdown computation for the public rendering contract.
//!
//! Visitors see a live countdown to the event; the derivation rule lives
//! here as a pure function of the event date/time and an explicit `now` so
//! it can be tested against a frozen clock.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Remaining time until an event, broken down for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    /// `true` once the event start has passed; all components are zero then.
    pub elapsed: bool,
}

impl Countdown {
    /// Compute the countdown from `now` to the event start.
    ///
    /// The event date/time is interpreted on the UTC timeline, matching the
    /// naive timestamps the records store.
    pub fn until(date: NaiveDate, time: NaiveTime, now: DateTime<Utc>) -> Self {
        let start = DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(time), Utc);
        let remaining = start.signed_duration_since(now);
        if remaining <= chrono::Duration::zero() {
            return Self {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
                elapsed: true,
            };
        }
        Self {
            days: remaining.num_days(),
            hours: remaining.num_hours() % 24,
            minutes: remaining.num_minutes() % 60,
            seconds: remaining.num_seconds() % 60,
            elapsed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().expect("valid timestamp")
    }

    #[test]
    fn breaks_remaining_time_into_components() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 12).expect("valid date");
        let time = NaiveTime::from_hms_opt(18, 30, 0).expect("valid time");
        let now = at(2026, 9, 10, 16, 15, 30);

        let countdown = Countdown::until(date, time, now);

        assert_eq!(
            countdown,
            Countdown {
                days: 2,
                hours: 2,
                minutes: 14,
                seconds: 30,
                elapsed: false,
            }
        );
    }

    #[rstest]
    #[case(at(2026, 9, 12, 18, 30, 0))] // exactly at start
    #[case(at(2027, 1, 1, 0, 0, 0))] // long past
    fn elapsed_events_report_zeros(#[case] now: DateTime<Utc>) {
        let date = NaiveDate::from_ymd_opt(2026, 9, 12).expect("valid date");
        let time = NaiveTime::from_hms_opt(18, 30, 0).expect("valid time");

        let countdown = Countdown::until(date, time, now);

        assert!(countdown.elapsed);
        assert_eq!((countdown.days, countdown.hours), (0, 0));
    }

    #[test]
    fn serialises_camel_case() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 12).expect("valid date");
        let time = NaiveTime::from_hms_opt(18, 30, 0).expect("valid time");
        let value = serde_json::to_value(Countdown::until(date, time, at(2026, 9, 1, 0, 0, 0)))
            .expect("serialise");
        assert!(value.get("elapsed").is_some());
        assert!(value.get("minutes").is_some());
    }
}
