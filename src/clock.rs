//! Calendar time for the clock report.
//!
//! The RP2350 has no calendar RTC block, so the firmware keeps a soft RTC: a
//! fixed [`DateTime`] epoch advanced by whole seconds of uptime. Years are two
//! digits (2000-2099), the same range a hardware RTC in binary mode reports.

/// Wall-clock reading.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct DateTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    /// Day of month, 1-based.
    pub day: u8,
    /// Month, 1-based.
    pub month: u8,
    /// Years since 2000 (0-99).
    pub year: u8,
}

const SECS_PER_DAY: u64 = 86_400;

#[inline]
const fn is_leap_year(year: u8) -> bool {
    // 2000-2099: every fourth year, 2000 included
    year % 4 == 0
}

const fn days_in_month(
    month: u8,
    year: u8,
) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl DateTime {
    /// Time `elapsed_secs` after `self`. The year wraps from 99 back to 0.
    pub fn advanced_by(
        self,
        elapsed_secs: u64,
    ) -> Self {
        let secs_of_day =
            u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds) + elapsed_secs;
        let mut days = secs_of_day / SECS_PER_DAY;
        let rem = secs_of_day % SECS_PER_DAY;

        let mut day = self.day.max(1);
        let mut month = self.month.clamp(1, 12);
        let mut year = self.year % 100;

        while days > 0 {
            let month_days = days_in_month(month, year);
            let left_in_month = u64::from(month_days - day.min(month_days)) + 1;
            if days < left_in_month {
                day += days as u8;
                days = 0;
            } else {
                days -= left_in_month;
                day = 1;
                month += 1;
                if month > 12 {
                    month = 1;
                    year = (year + 1) % 100;
                }
            }
        }

        Self {
            hours: (rem / 3600) as u8,
            minutes: ((rem % 3600) / 60) as u8,
            seconds: (rem % 60) as u8,
            day,
            month,
            year,
        }
    }
}

/// Soft RTC: a calendar epoch plus seconds of uptime.
#[derive(Clone, Copy, Debug)]
pub struct SoftRtc {
    epoch: DateTime,
}

impl SoftRtc {
    pub const fn new(epoch: DateTime) -> Self { Self { epoch } }

    /// Calendar time after `uptime_secs` seconds.
    #[inline]
    pub fn read(
        &self,
        uptime_secs: u64,
    ) -> DateTime {
        self.epoch.advanced_by(uptime_secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
