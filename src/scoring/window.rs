use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::error::{AppError, Result};

/// The team clock is fixed UTC+9 (Tokyo), no DST.
pub fn team_tz() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("UTC+9 is a valid offset")
}

pub fn now_team() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&team_tz())
}

/// Half-open month window `[start, end)` in the team timezone,
/// normalized to UTC for comparison against stored timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    /// Membership test: start inclusive, end exclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

pub fn month_range(year: i32, month: u32) -> Result<MonthWindow> {
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation(format!("Invalid month: {}", month)));
    }
    if !(1970..=9999).contains(&year) {
        return Err(AppError::Validation(format!("Invalid year: {}", year)));
    }

    let tz = team_tz();
    let start = first_of_month(tz, year, month)?;
    let end = if month == 12 {
        first_of_month(tz, year + 1, 1)?
    } else {
        first_of_month(tz, year, month + 1)?
    };

    Ok(MonthWindow {
        year,
        month,
        start: start.with_timezone(&Utc),
        end: end.with_timezone(&Utc),
    })
}

fn first_of_month(tz: FixedOffset, year: i32, month: u32) -> Result<DateTime<FixedOffset>> {
    tz.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Validation(format!("Invalid month: {}-{}", year, month)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_is_half_open() {
        let w = month_range(2025, 3).unwrap();
        assert!(w.contains(w.start));
        assert!(!w.contains(w.end));
        assert!(w.contains(w.end - chrono::Duration::seconds(1)));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let w = month_range(2025, 12).unwrap();
        let jan = month_range(2026, 1).unwrap();
        assert_eq!(w.end, jan.start);
    }

    #[test]
    fn boundaries_are_fixed_utc_plus_nine() {
        let w = month_range(2025, 3).unwrap();
        // Midnight on March 1st in Tokyo is 15:00 UTC on February 28th.
        let expected = Utc.with_ymd_and_hms(2025, 2, 28, 15, 0, 0).unwrap();
        assert_eq!(w.start, expected);
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(month_range(2025, 0).is_err());
        assert!(month_range(2025, 13).is_err());
    }
}
