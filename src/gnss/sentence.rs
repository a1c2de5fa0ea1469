//! # NMEA Sentence Parsing
//!
//! Lookup and positional decoding of the sentences the receiver emits.
//! Every function here is total: a missing sentence or a short field is
//! reported as `None`/`false`, never as a panic.
//!
//! RMC layout consumed:
//!
//! ```text
//! $GNRMC,<hhmmss.sss>,<A|V>,<ddmm.mmmm>,<N|S>,<dddmm.mmmm>,<E|W>,<spd>,<cog>,<ddmmyy>,...
//! ```

use super::fix::{
    CalendarDate, SatelliteFix, TimeOfDay, HEMISPHERE_NEGATIVE, HEMISPHERE_POSITIVE,
};

/// Marker of the fix-quality sentence
pub const FIX_QUALITY_MARKER: &str = "GGA";

/// Marker of the status-text sentence
pub const STATUS_TEXT_MARKER: &str = "TXT";

/// Marker of the recommended-minimum-data sentence
pub const RMC_MARKER: &str = "RMC";

/// Field separator within a sentence
pub const FIELD_DELIMITER: char = ',';

/// RMC status value meaning "fix valid"
pub const STATUS_VALID: &str = "A";

const RMC_TIME: usize = 1;
const RMC_STATUS: usize = 2;
const RMC_LATITUDE: usize = 3;
const RMC_LATITUDE_HEMISPHERE: usize = 4;
const RMC_LONGITUDE: usize = 5;
const RMC_LONGITUDE_HEMISPHERE: usize = 6;
const RMC_DATE: usize = 9;

/// Degree digits of a latitude field (`ddmm.mmmm`)
pub const LATITUDE_DEGREE_DIGITS: usize = 2;

/// Degree digits of a longitude field (`dddmm.mmmm`)
pub const LONGITUDE_DEGREE_DIGITS: usize = 3;

/// True iff both the fix-quality and status-text markers are present
pub fn check_integrity(buffer: &str) -> bool {
    buffer.contains(FIX_QUALITY_MARKER) && buffer.contains(STATUS_TEXT_MARKER)
}

/// True iff an RMC sentence is present and its status is `A`
pub fn check_validity(buffer: &str) -> bool {
    find_sentence(buffer, RMC_MARKER)
        .and_then(|sentence| sentence.split(FIELD_DELIMITER).nth(RMC_STATUS))
        .map_or(false, |status| status == STATUS_VALID)
}

/// Locate the first sentence whose address field contains `marker`
///
/// The returned slice starts at `$` (when present) and excludes the line
/// terminator.
pub fn find_sentence<'a>(buffer: &'a str, marker: &str) -> Option<&'a str> {
    buffer
        .lines()
        .map(|line| match line.find('$') {
            Some(start) => &line[start..],
            None => line,
        })
        .map(str::trim_end)
        .find(|sentence| {
            sentence
                .split(FIELD_DELIMITER)
                .next()
                .map_or(false, |address| address.contains(marker))
        })
}

/// Which timestamp fields one RMC sentence supplied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RmcFields {
    pub time: bool,
    pub date: bool,
}

/// Decode an RMC sentence into `fix`
///
/// Fields that are too short or not numeric keep their previous value.
pub fn parse_rmc(sentence: &str, fix: &mut SatelliteFix) -> RmcFields {
    let fields: Vec<&str> = sentence.split(FIELD_DELIMITER).collect();
    let field = |index: usize| fields.get(index).copied().unwrap_or("");

    fix.valid = field(RMC_STATUS) == STATUS_VALID;

    let time = decode_time(field(RMC_TIME));
    if let Some(time) = time {
        fix.time = time;
    }

    if let Some(latitude) = decode_coordinate(field(RMC_LATITUDE), LATITUDE_DEGREE_DIGITS) {
        fix.latitude = latitude;
    }
    if let Some(flag) = decode_hemisphere(field(RMC_LATITUDE_HEMISPHERE), 'N') {
        fix.latitude_hemisphere = flag;
    }

    if let Some(longitude) = decode_coordinate(field(RMC_LONGITUDE), LONGITUDE_DEGREE_DIGITS) {
        fix.longitude = longitude;
    }
    if let Some(flag) = decode_hemisphere(field(RMC_LONGITUDE_HEMISPHERE), 'E') {
        fix.longitude_hemisphere = flag;
    }

    let date = decode_date(field(RMC_DATE));
    if let Some(date) = date {
        fix.date = date;
    }

    RmcFields {
        time: time.is_some(),
        date: date.is_some(),
    }
}

/// Decode `hhmmss[.sss]`
pub fn decode_time(field: &str) -> Option<TimeOfDay> {
    if field.len() < 6 {
        return None;
    }

    let hour = two_digits(field.get(0..2)?)?;
    let minute = two_digits(field.get(2..4)?)?;
    let second = two_digits(field.get(4..6)?)?;

    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    Some(TimeOfDay::new(hour, minute, second))
}

/// Decode `ddmmyy`
pub fn decode_date(field: &str) -> Option<CalendarDate> {
    if field.len() < 6 {
        return None;
    }

    let day = two_digits(field.get(0..2)?)?;
    let month = two_digits(field.get(2..4)?)?;
    let year = two_digits(field.get(4..6)?)?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }

    Some(CalendarDate::new(day, month, year))
}

/// Decode a degrees-and-minutes coordinate into decimal degrees
///
/// `degree_digits` leading characters are whole degrees; the remainder,
/// fractional part included, is minutes.
///
/// # Examples
///
/// ```
/// use nbiot_tracker::gnss::sentence::decode_coordinate;
///
/// let lat = decode_coordinate("3106.67898", 2).unwrap();
/// assert!((lat - (31.0 + 6.67898 / 60.0)).abs() < 1e-9);
/// ```
pub fn decode_coordinate(field: &str, degree_digits: usize) -> Option<f64> {
    if field.len() <= degree_digits {
        return None;
    }

    let degrees_text = field.get(..degree_digits)?;
    if !degrees_text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let degrees: f64 = degrees_text.parse().ok()?;

    let minutes_text = field.get(degree_digits..)?;
    if !minutes_text.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    let minutes: f64 = minutes_text.parse().ok()?;

    Some(degrees + minutes / 60.0)
}

/// Map a hemisphere letter to its flag; anything but `positive` is negative
pub fn hemisphere_flag(letter: char, positive: char) -> u8 {
    if letter == positive {
        HEMISPHERE_POSITIVE
    } else {
        HEMISPHERE_NEGATIVE
    }
}

fn decode_hemisphere(field: &str, positive: char) -> Option<u8> {
    field.chars().next().map(|letter| hemisphere_flag(letter, positive))
}

fn two_digits(text: &str) -> Option<u8> {
    if text.len() == 2 && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}
