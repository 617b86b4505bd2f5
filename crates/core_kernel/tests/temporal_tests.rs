//! Unit tests for calendar windows and clocks

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::temporal::{add_days, Clock, DateWindow, FixedClock, SystemClock, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod date_window {
    use super::*;

    #[test]
    fn test_single_day_window() {
        let w = DateWindow::new(date(2025, 10, 10), date(2025, 10, 10)).unwrap();
        assert!(w.contains(date(2025, 10, 10)));
        assert_eq!(w.days(), 0);
    }

    #[test]
    fn test_week_crossing_month_boundary() {
        // 2025-10-01 is a Wednesday
        let week = DateWindow::iso_week_of(date(2025, 10, 1));
        assert_eq!(week.start, date(2025, 9, 29));
        assert_eq!(week.end, date(2025, 10, 5));
    }

    #[test]
    fn test_week_crossing_year_boundary() {
        let week = DateWindow::iso_week_of(date(2026, 1, 1));
        assert_eq!(week.start, date(2025, 12, 29));
        assert!(week.contains(date(2026, 1, 4)));
    }

    #[test]
    fn test_month_of_thirty_day_month() {
        let month = DateWindow::month_of(date(2025, 11, 30));
        assert_eq!(month.start, date(2025, 11, 1));
        assert_eq!(month.end, date(2025, 11, 30));
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(date(2025, 10, 1), 5).unwrap(), date(2025, 10, 6));
        assert!(add_days(NaiveDate::MAX, 1).is_err());
    }
}

mod timezone {
    use super::*;

    #[test]
    fn test_parse_known_zone() {
        let tz: Timezone = "Asia/Ho_Chi_Minh".parse().unwrap();
        assert_eq!(serde_json::to_string(&tz).unwrap(), "\"Asia/Ho_Chi_Minh\"");
    }

    #[test]
    fn test_parse_unknown_zone_fails() {
        assert!("Nowhere/Special".parse::<Timezone>().is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_zone() {
        let result: Result<Timezone, _> = serde_json::from_str("\"Bad/Zone\"");
        assert!(result.is_err());
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_today_respects_timezone() {
        let tz: Timezone = "Asia/Ho_Chi_Minh".parse().unwrap();
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2025, 10, 9, 20, 0, 0).unwrap())
            .with_timezone(tz);
        assert_eq!(clock.today(), date(2025, 10, 10));
    }

    #[test]
    fn test_fixed_clock_can_move_backwards() {
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2025, 10, 10, 8, 0, 0).unwrap());
        clock.set(Utc.with_ymd_and_hms(2025, 10, 9, 8, 0, 0).unwrap());
        assert_eq!(clock.today(), date(2025, 10, 9));
    }

    #[test]
    fn test_system_clock_is_close_to_now() {
        let clock = SystemClock::default();
        let drift = (Utc::now() - clock.now()).num_seconds().abs();
        assert!(drift < 5);
    }
}
