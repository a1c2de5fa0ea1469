//! # Satellite Fix Types
//!
//! Time, date and position decoded from one RMC sentence, plus the fixed
//! zone shift applied before the fix is copied into a telemetry record.

/// Hours added to UTC for local time
pub const ZONE_OFFSET_HOURS: u8 = 8;

/// Hemisphere flag for north latitude / east longitude
pub const HEMISPHERE_POSITIVE: u8 = 0;

/// Hemisphere flag for south latitude / west longitude
pub const HEMISPHERE_NEGATIVE: u8 = 1;

/// Time of day (hour 0-23, minute 0-59, second 0-59)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self { hour, minute, second }
    }
}

/// Calendar date with a two-digit year (2000 + `year`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarDate {
    pub day: u8,
    pub month: u8,
    pub year: u8,
}

impl CalendarDate {
    pub fn new(day: u8, month: u8, year: u8) -> Self {
        Self { day, month, year }
    }

    /// Gregorian leap-year rule applied to 2000 + `year`
    pub fn is_leap_year(&self) -> bool {
        let y = 2000 + self.year as u16;
        (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
    }

    /// Number of days in the current month
    ///
    /// An unknown month (0 before the first date is decoded) counts as 31.
    pub fn days_in_month(&self) -> u8 {
        match self.month {
            2 if self.is_leap_year() => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Advance one day, carrying into month and year
    pub fn advance_day(&mut self) {
        self.day += 1;
        if self.day > self.days_in_month() {
            self.day = 1;
            self.month += 1;
            if self.month > 12 {
                self.month = 1;
                self.year = (self.year + 1) % 100;
            }
        }
    }
}

/// A satellite-derived time and position solution
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SatelliteFix {
    pub time: TimeOfDay,
    pub date: CalendarDate,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// 0 = N, 1 = S
    pub latitude_hemisphere: u8,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// 0 = E, 1 = W
    pub longitude_hemisphere: u8,
    /// Status field of the sentence was `A`
    pub valid: bool,
}

impl SatelliteFix {
    /// Shift the time forward by `hours` (< 24), carrying into the date
    pub fn shift_zone(&mut self, hours: u8) {
        let hour = self.time.hour + hours % 24;
        if hour >= 24 {
            self.time.hour = hour - 24;
            self.date.advance_day();
        } else {
            self.time.hour = hour;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(time: TimeOfDay, date: CalendarDate) -> SatelliteFix {
        SatelliteFix {
            time,
            date,
            ..Default::default()
        }
    }

    #[test]
    fn test_shift_without_carry() {
        let mut fix = fix_at(TimeOfDay::new(3, 0, 0), CalendarDate::new(15, 6, 25));
        fix.shift_zone(ZONE_OFFSET_HOURS);

        assert_eq!(fix.time, TimeOfDay::new(11, 0, 0));
        assert_eq!(fix.date, CalendarDate::new(15, 6, 25));
    }

    #[test]
    fn test_shift_carries_into_march_on_non_leap_year() {
        let mut fix = fix_at(TimeOfDay::new(20, 0, 0), CalendarDate::new(28, 2, 23));
        fix.shift_zone(ZONE_OFFSET_HOURS);

        assert_eq!(fix.time, TimeOfDay::new(4, 0, 0));
        assert_eq!(fix.date, CalendarDate::new(1, 3, 23));
    }

    #[test]
    fn test_shift_stays_in_february_on_leap_year() {
        let mut fix = fix_at(TimeOfDay::new(20, 30, 15), CalendarDate::new(28, 2, 24));
        fix.shift_zone(ZONE_OFFSET_HOURS);

        assert_eq!(fix.time, TimeOfDay::new(4, 30, 15));
        assert_eq!(fix.date, CalendarDate::new(29, 2, 24));
    }

    #[test]
    fn test_shift_carries_into_new_year() {
        let mut fix = fix_at(TimeOfDay::new(16, 0, 0), CalendarDate::new(31, 12, 99));
        fix.shift_zone(ZONE_OFFSET_HOURS);

        assert_eq!(fix.time, TimeOfDay::new(0, 0, 0));
        assert_eq!(fix.date, CalendarDate::new(1, 1, 0));
    }

    #[test]
    fn test_shift_at_thirty_day_month_end() {
        let mut fix = fix_at(TimeOfDay::new(23, 59, 59), CalendarDate::new(30, 4, 25));
        fix.shift_zone(ZONE_OFFSET_HOURS);

        assert_eq!(fix.time, TimeOfDay::new(7, 59, 59));
        assert_eq!(fix.date, CalendarDate::new(1, 5, 25));
    }

    #[test]
    fn test_leap_year_rule() {
        assert!(CalendarDate::new(1, 1, 0).is_leap_year()); // 2000
        assert!(CalendarDate::new(1, 1, 24).is_leap_year());
        assert!(!CalendarDate::new(1, 1, 23).is_leap_year());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(CalendarDate::new(1, 1, 25).days_in_month(), 31);
        assert_eq!(CalendarDate::new(1, 2, 25).days_in_month(), 28);
        assert_eq!(CalendarDate::new(1, 2, 28).days_in_month(), 29);
        assert_eq!(CalendarDate::new(1, 9, 25).days_in_month(), 30);
        assert_eq!(CalendarDate::new(0, 0, 0).days_in_month(), 31);
    }
}
