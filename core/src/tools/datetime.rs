use crate::config::ClockConfig;
use chrono::{DateTime, FixedOffset, Offset, Utc};

/// "It is currently Friday, October 16, 2026 at 09:30 AM Eastern Time."
pub fn describe_time(now: DateTime<Utc>, clock: &ClockConfig) -> String {
    let offset = FixedOffset::east_opt(clock.utc_offset_hours * 3600)
        .unwrap_or_else(|| Utc.fix());
    let local = now.with_timezone(&offset);
    format!(
        "It is currently {} {}.",
        local.format("%A, %B %d, %Y at %I:%M %p"),
        clock.zone_label
    )
}

pub fn describe_now(clock: &ClockConfig) -> String {
    describe_time(Utc::now(), clock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_in_configured_offset() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 13, 30, 0).unwrap();
        assert_eq!(
            describe_time(now, &ClockConfig::default()),
            "It is currently Friday, October 16, 2026 at 09:30 AM Eastern Time."
        );
    }

    #[test]
    fn offset_can_cross_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 2, 5, 0).unwrap();
        let clock = ClockConfig {
            utc_offset_hours: -5,
            zone_label: "EST".into(),
        };
        assert_eq!(
            describe_time(now, &clock),
            "It is currently Wednesday, December 31, 2025 at 09:05 PM EST."
        );
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 13, 30, 0).unwrap();
        let clock = ClockConfig {
            utc_offset_hours: 99,
            zone_label: "UTC".into(),
        };
        assert!(describe_time(now, &clock).contains("01:30 PM UTC"));
    }
}
