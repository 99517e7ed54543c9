//! Calendar-field decomposition and recomposition for XSD date/time literals.
//!
//! A [`CalendarValue`] holds the fields a date/time lexical form can carry,
//! each independently present or absent. Decomposition ([`From`]/[`TryFrom`]
//! conversions) extracts the fields a concrete temporal type supports;
//! recomposition ([`CalendarValue::to_value`]) picks the concrete type back
//! from the fields that are present.

use crate::value::Value;
use bigdecimal::BigDecimal;
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::fmt;
use std::str::FromStr;

/// Widest timezone offset the lexical space allows, in minutes (+14:00).
pub const MAX_OFFSET_MINUTES: i16 = 14 * 60;

/// Narrowest timezone offset the lexical space allows, in minutes (-14:00).
pub const MIN_OFFSET_MINUTES: i16 = -14 * 60;

/// A timezone offset that is not a whole number of minutes within ±14:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid timezone offset of {offset_seconds}s: the offset must be a whole number of minutes between -14:00 and +14:00")]
pub struct InvalidOffsetError {
    offset_seconds: i32,
}

/// A calendar date carrying a timezone offset but no time-of-day.
///
/// `xsd:date` legally carries a timezone even though no time is present.
/// Standard temporal libraries have no such type, so this crate defines one
/// rather than inventing a midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetDate {
    pub date: NaiveDate,
    pub offset: FixedOffset,
}

impl OffsetDate {
    #[inline]
    pub fn new(date: NaiveDate, offset: FixedOffset) -> Self {
        Self { date, offset }
    }
}

impl fmt::Display for OffsetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.date, self.offset)
    }
}

/// A time-of-day carrying a timezone offset but no date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetTime {
    pub time: NaiveTime,
    pub offset: FixedOffset,
}

impl OffsetTime {
    #[inline]
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }
}

impl fmt::Display for OffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.time, self.offset)
    }
}

/// The decomposed calendar fields of a date/time literal.
///
/// A time literal has no date fields and a date literal no time fields;
/// absence means the source does not carry the field, never that it is zero.
/// The year is arbitrary-precision. The fractional second, when present, is
/// a decimal in `[0, 1)`: an exact zero means the source tracks subsecond
/// resolution and it is zero, while `None` means the source has no subsecond
/// field at all. The timezone offset, when present, is whole minutes within
/// [`MIN_OFFSET_MINUTES`]..=[`MAX_OFFSET_MINUTES`]; out-of-range offsets are
/// rejected by [`to_value`](CalendarValue::to_value), never clamped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarValue {
    pub year: Option<BigInt>,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
    pub fraction: Option<BigDecimal>,
    pub offset_minutes: Option<i16>,
}

impl CalendarValue {
    /// Recomposes the concrete temporal value these fields describe.
    ///
    /// The target is selected by field presence: full date fields alone make
    /// a [`Value::Date`] (or [`Value::OffsetDate`] with an offset), time
    /// fields alone a [`Value::Time`]/[`Value::OffsetTime`], both together a
    /// [`Value::DateTime`]/[`Value::OffsetDateTime`]. Any other combination
    /// is an error.
    ///
    /// An hour of 24 with zero minutes and seconds collapses to 00:00:00 on
    /// the same calendar day; the date is not advanced. Callers that need
    /// day rollover must apply it themselves.
    pub fn to_value(&self) -> Result<Value, CalendarError> {
        let date = match (&self.year, self.month, self.day) {
            (Some(year), Some(month), Some(day)) => Some(date_from(year, month, day)?),
            (None, None, None) => None,
            _ => return Err(CalendarError::UnsupportedFieldCombination),
        };
        let time = match (self.hour, self.minute) {
            (Some(hour), Some(minute)) => {
                Some(time_from(hour, minute, self.second, self.fraction.as_ref())?)
            }
            (None, None) => {
                if self.second.is_some() || self.fraction.is_some() {
                    return Err(CalendarError::UnsupportedFieldCombination);
                }
                None
            }
            _ => return Err(CalendarError::UnsupportedFieldCombination),
        };
        let offset = match self.offset_minutes {
            Some(minutes) => Some(offset_from_minutes(minutes)?),
            None => None,
        };
        Ok(match (date, time, offset) {
            (Some(date), Some(time), Some(offset)) => Value::OffsetDateTime(
                offset
                    .from_local_datetime(&NaiveDateTime::new(date, time))
                    .single()
                    .ok_or(CalendarError::OutOfRange)?,
            ),
            (Some(date), Some(time), None) => Value::DateTime(NaiveDateTime::new(date, time)),
            (Some(date), None, Some(offset)) => Value::OffsetDate(OffsetDate::new(date, offset)),
            (Some(date), None, None) => Value::Date(date),
            (None, Some(time), Some(offset)) => Value::OffsetTime(OffsetTime::new(time, offset)),
            (None, Some(time), None) => Value::Time(time),
            (None, None, _) => return Err(CalendarError::UnsupportedFieldCombination),
        })
    }
}

impl From<NaiveDate> for CalendarValue {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: Some(BigInt::from(date.year())),
            month: narrow(date.month()),
            day: narrow(date.day()),
            ..Self::default()
        }
    }
}

impl From<NaiveTime> for CalendarValue {
    fn from(time: NaiveTime) -> Self {
        // chrono represents a leap second as nanosecond() >= 1_000_000_000;
        // the lexical space has no second 60, so it folds into the last
        // representable fraction of the previous second.
        let nanos = time.nanosecond().min(999_999_999);
        Self {
            hour: narrow(time.hour()),
            minute: narrow(time.minute()),
            second: narrow(time.second()),
            fraction: Some(fraction_from_nanos(nanos)),
            ..Self::default()
        }
    }
}

impl From<NaiveDateTime> for CalendarValue {
    fn from(value: NaiveDateTime) -> Self {
        let date = Self::from(value.date());
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            ..Self::from(value.time())
        }
    }
}

impl TryFrom<OffsetDate> for CalendarValue {
    type Error = InvalidOffsetError;

    fn try_from(value: OffsetDate) -> Result<Self, InvalidOffsetError> {
        Ok(Self {
            offset_minutes: Some(offset_minutes(value.offset)?),
            ..Self::from(value.date)
        })
    }
}

impl TryFrom<OffsetTime> for CalendarValue {
    type Error = InvalidOffsetError;

    fn try_from(value: OffsetTime) -> Result<Self, InvalidOffsetError> {
        Ok(Self {
            offset_minutes: Some(offset_minutes(value.offset)?),
            ..Self::from(value.time)
        })
    }
}

impl TryFrom<DateTime<FixedOffset>> for CalendarValue {
    type Error = InvalidOffsetError;

    fn try_from(value: DateTime<FixedOffset>) -> Result<Self, InvalidOffsetError> {
        Ok(Self {
            offset_minutes: Some(offset_minutes(*value.offset())?),
            ..Self::from(value.naive_local())
        })
    }
}

impl fmt::Display for CalendarValue {
    /// Writes the canonical lexical form of the fields that are present:
    /// a zero fraction is omitted and a zero offset is written as `Z`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(year), Some(month), Some(day)) = (&self.year, self.month, self.day) {
            write_year(f, year)?;
            write!(f, "-{month:02}-{day:02}")?;
            if self.hour.is_some() {
                f.write_str("T")?;
            }
        }
        if let (Some(hour), Some(minute)) = (self.hour, self.minute) {
            let second = self.second.unwrap_or(0);
            write!(f, "{hour:02}:{minute:02}:{second:02}")?;
            if let Some(fraction) = &self.fraction {
                write_fraction(f, fraction)?;
            }
        }
        if let Some(minutes) = self.offset_minutes {
            write_offset(f, minutes)?;
        }
        Ok(())
    }
}

/// An error recomposing a [`CalendarValue`] into a concrete temporal value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("the year {year} is outside the supported calendar range")]
    YearOutOfRange { year: BigInt },
    #[error("{year}-{month:02}-{day:02} is not a valid calendar date")]
    InvalidDate { year: i32, month: u8, day: u8 },
    #[error("{hour:02}:{minute:02}:{second:02} is not a valid time of day")]
    InvalidTime { hour: u8, minute: u8, second: u8 },
    #[error("a fractional second must be a decimal within [0, 1)")]
    InvalidFraction,
    #[error("the combination of calendar fields present describes neither a date, a time nor a date-time")]
    UnsupportedFieldCombination,
    #[error(transparent)]
    InvalidOffset(#[from] InvalidOffsetError),
    #[error("the date-time is outside the supported calendar range")]
    OutOfRange,
}

fn date_from(year: &BigInt, month: u8, day: u8) -> Result<NaiveDate, CalendarError> {
    let out_of_range = || CalendarError::YearOutOfRange { year: year.clone() };
    let y = year.to_i32().ok_or_else(out_of_range)?;
    if !(NaiveDate::MIN.year()..=NaiveDate::MAX.year()).contains(&y) {
        return Err(out_of_range());
    }
    NaiveDate::from_ymd_opt(y, u32::from(month), u32::from(day))
        .ok_or(CalendarError::InvalidDate { year: y, month, day })
}

fn time_from(
    hour: u8,
    minute: u8,
    second: Option<u8>,
    fraction: Option<&BigDecimal>,
) -> Result<NaiveTime, CalendarError> {
    let second = second.unwrap_or(0);
    let nanos = match fraction {
        Some(fraction) => nanos_from_fraction(fraction)?,
        None => 0,
    };
    // 24:00:00 is the lexical end-of-day form; it collapses to 00:00:00 on
    // the same calendar day, without advancing the date.
    let hour = if hour == 24 {
        if minute != 0 || second != 0 || nanos != 0 {
            return Err(CalendarError::InvalidTime { hour, minute, second });
        }
        0
    } else {
        hour
    };
    NaiveTime::from_hms_nano_opt(
        u32::from(hour),
        u32::from(minute),
        u32::from(second),
        nanos,
    )
    .ok_or(CalendarError::InvalidTime { hour, minute, second })
}

fn offset_minutes(offset: FixedOffset) -> Result<i16, InvalidOffsetError> {
    let offset_seconds = offset.local_minus_utc();
    let error = InvalidOffsetError { offset_seconds };
    if offset_seconds % 60 != 0 {
        return Err(error);
    }
    let minutes = i16::try_from(offset_seconds / 60).map_err(|_| error)?;
    if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
        return Err(error);
    }
    Ok(minutes)
}

fn offset_from_minutes(minutes: i16) -> Result<FixedOffset, InvalidOffsetError> {
    let offset_seconds = i32::from(minutes) * 60;
    let error = InvalidOffsetError { offset_seconds };
    if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
        return Err(error);
    }
    FixedOffset::east_opt(offset_seconds).ok_or(error)
}

/// Converts a fractional second to nanoseconds, truncating toward zero.
///
/// At most nine digits of the plain decimal expansion are read, so the
/// result is at most 999,999,999 and can never round up into a full second.
fn nanos_from_fraction(fraction: &BigDecimal) -> Result<u32, CalendarError> {
    if fraction.is_negative() || *fraction >= BigDecimal::from(1) {
        return Err(CalendarError::InvalidFraction);
    }
    let plain = fraction.to_plain_string();
    let digits = plain.strip_prefix("0.").unwrap_or("");
    let mut nanos = 0_u32;
    let mut taken = 0;
    for byte in digits.bytes().take(9) {
        nanos = nanos * 10 + u32::from(byte - b'0');
        taken += 1;
    }
    for _ in taken..9 {
        nanos *= 10;
    }
    Ok(nanos)
}

fn fraction_from_nanos(nanos: u32) -> BigDecimal {
    if nanos == 0 {
        BigDecimal::zero()
    } else {
        BigDecimal::new(BigInt::from(nanos), 9).normalized()
    }
}

fn narrow(field: u32) -> Option<u8> {
    u8::try_from(field).ok()
}

fn write_year(f: &mut fmt::Formatter<'_>, year: &BigInt) -> fmt::Result {
    if year.is_negative() {
        f.write_str("-")?;
    }
    let digits = year.magnitude().to_string();
    for _ in digits.len()..4 {
        f.write_str("0")?;
    }
    f.write_str(&digits)
}

fn write_fraction(f: &mut fmt::Formatter<'_>, fraction: &BigDecimal) -> fmt::Result {
    if fraction.is_zero() {
        return Ok(());
    }
    let plain = fraction.normalized().to_plain_string();
    match plain.strip_prefix("0.") {
        Some(digits) => write!(f, ".{digits}"),
        None => Ok(()),
    }
}

fn write_offset(f: &mut fmt::Formatter<'_>, minutes: i16) -> fmt::Result {
    if minutes == 0 {
        return f.write_str("Z");
    }
    let sign = if minutes < 0 { '-' } else { '+' };
    let magnitude = minutes.unsigned_abs();
    write!(f, "{sign}{:02}:{:02}", magnitude / 60, magnitude % 60)
}

/// An error raised while parsing a date/time lexical form.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}")]
pub struct CalendarParseError {
    kind: ParseErrorKind,
}

impl CalendarParseError {
    const fn msg(message: &'static str) -> Self {
        Self {
            kind: ParseErrorKind::Msg(message),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
enum ParseErrorKind {
    #[error("{0}")]
    Msg(&'static str),
    #[error("{day} is not a valid day of month {month:02}")]
    InvalidDayOfMonth { day: u8, month: u8 },
}

/// Parses an `xsd:date` lexical form, e.g. `2002-05-30` or `2002-05-30+02:00`.
pub fn parse_date(input: &str) -> Result<CalendarValue, CalendarParseError> {
    ensure_complete(input, |input| {
        let ((year, month, day), input) = ymd_frag(input)?;
        let (offset_minutes, input) = optional_end(input, offset_frag)?;
        Ok((
            CalendarValue {
                year: Some(year),
                month: Some(month),
                day: Some(day),
                offset_minutes,
                ..CalendarValue::default()
            },
            input,
        ))
    })
}

/// Parses an `xsd:time` lexical form, e.g. `13:20:00.5` or `24:00:00Z`.
pub fn parse_time(input: &str) -> Result<CalendarValue, CalendarParseError> {
    ensure_complete(input, |input| {
        let (fields, input) = time_of_day_frag(input)?;
        let (offset_minutes, input) = optional_end(input, offset_frag)?;
        Ok((
            CalendarValue {
                offset_minutes,
                ..fields
            },
            input,
        ))
    })
}

/// Parses an `xsd:dateTime` lexical form, e.g. `2002-05-30T09:30:10-06:00`.
pub fn parse_date_time(input: &str) -> Result<CalendarValue, CalendarParseError> {
    ensure_complete(input, |input| {
        let ((year, month, day), input) = ymd_frag(input)?;
        let input = expect_char(input, 'T', "expected 'T' between the date and the time")?;
        let (fields, input) = time_of_day_frag(input)?;
        let (offset_minutes, input) = optional_end(input, offset_frag)?;
        Ok((
            CalendarValue {
                year: Some(year),
                month: Some(month),
                day: Some(day),
                offset_minutes,
                ..fields
            },
            input,
        ))
    })
}

fn ymd_frag(input: &str) -> Result<((BigInt, u8, u8), &str), CalendarParseError> {
    let (year, input) = year_frag(input)?;
    let input = expect_char(input, '-', "expected '-' after the year")?;
    let (month, input) = two_digit_frag(input, "the month must be two digits")?;
    if !(1..=12).contains(&month) {
        return Err(CalendarParseError::msg("the month must lie within 01-12"));
    }
    let input = expect_char(input, '-', "expected '-' after the month")?;
    let (day, input) = two_digit_frag(input, "the day must be two digits")?;
    if day == 0 {
        return Err(CalendarParseError::msg("the day must not be 00"));
    }
    validate_day_of_month(&year, month, day)?;
    Ok(((year, month, day), input))
}

fn time_of_day_frag(input: &str) -> Result<(CalendarValue, &str), CalendarParseError> {
    let (hour, input) = two_digit_frag(input, "the hour must be two digits")?;
    if hour > 24 {
        return Err(CalendarParseError::msg("the hour must lie within 00-24"));
    }
    let input = expect_char(input, ':', "expected ':' after the hour")?;
    let (minute, input) = two_digit_frag(input, "the minute must be two digits")?;
    if minute > 59 {
        return Err(CalendarParseError::msg("the minute must lie within 00-59"));
    }
    let input = expect_char(input, ':', "expected ':' after the minute")?;
    let (second, input) = two_digit_frag(input, "the second must be two digits")?;
    if second > 59 {
        return Err(CalendarParseError::msg("the second must lie within 00-59"));
    }
    let (fraction, input) = fraction_frag(input)?;
    if hour == 24 && (minute != 0 || second != 0 || fraction.as_ref().is_some_and(|f| !f.is_zero()))
    {
        return Err(CalendarParseError::msg(
            "no time of day lies beyond 24:00:00",
        ));
    }
    Ok((
        CalendarValue {
            hour: Some(hour),
            minute: Some(minute),
            second: Some(second),
            fraction,
            ..CalendarValue::default()
        },
        input,
    ))
}

fn year_frag(input: &str) -> Result<(BigInt, &str), CalendarParseError> {
    let (negative, unsigned) = match input.strip_prefix('-') {
        Some(left) => (true, left),
        None => (false, input),
    };
    let (digits, left) = digits_prefix(unsigned);
    if digits.len() < 4 {
        return Err(CalendarParseError::msg(
            "the year must have at least four digits",
        ));
    }
    if digits.len() > 4 && digits.starts_with('0') {
        return Err(CalendarParseError::msg(
            "a year of more than four digits must not start with zero",
        ));
    }
    let year = BigInt::from_str(digits)
        .map_err(|_| CalendarParseError::msg("the year digits are not a number"))?;
    Ok((if negative { -year } else { year }, left))
}

fn two_digit_frag<'a>(
    input: &'a str,
    error_message: &'static str,
) -> Result<(u8, &'a str), CalendarParseError> {
    let (digits, left) = input
        .split_at_checked(2)
        .ok_or(CalendarParseError::msg(error_message))?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalendarParseError::msg(error_message));
    }
    let value = digits
        .parse::<u8>()
        .map_err(|_| CalendarParseError::msg(error_message))?;
    Ok((value, left))
}

fn fraction_frag(input: &str) -> Result<(Option<BigDecimal>, &str), CalendarParseError> {
    let Some(after_dot) = input.strip_prefix('.') else {
        return Ok((None, input));
    };
    let (digits, left) = digits_prefix(after_dot);
    if digits.is_empty() {
        return Err(CalendarParseError::msg(
            "expected digits after the decimal point",
        ));
    }
    let numerator = BigInt::from_str(digits)
        .map_err(|_| CalendarParseError::msg("the fractional second digits are not a number"))?;
    let scale = i64::try_from(digits.len())
        .map_err(|_| CalendarParseError::msg("the fractional second is too long"))?;
    Ok((Some(BigDecimal::new(numerator, scale)), left))
}

fn offset_frag(input: &str) -> Result<(i16, &str), CalendarParseError> {
    if let Some(left) = input.strip_prefix('Z') {
        return Ok((0, left));
    }
    let (sign, input) = if let Some(left) = input.strip_prefix('+') {
        (1, left)
    } else if let Some(left) = input.strip_prefix('-') {
        (-1, left)
    } else {
        return Err(CalendarParseError::msg("expected a timezone offset"));
    };
    let (hours, input) = two_digit_frag(input, "the timezone offset hours must be two digits")?;
    let input = expect_char(input, ':', "expected ':' in the timezone offset")?;
    let (minutes, input) = two_digit_frag(input, "the timezone offset minutes must be two digits")?;
    if minutes > 59 {
        return Err(CalendarParseError::msg(
            "the timezone offset minutes must lie within 00-59",
        ));
    }
    if hours > 14 || (hours == 14 && minutes != 0) {
        return Err(CalendarParseError::msg(
            "the timezone offset must lie within -14:00 and +14:00",
        ));
    }
    Ok((sign * (i16::from(hours) * 60 + i16::from(minutes)), input))
}

fn digits_prefix(input: &str) -> (&str, &str) {
    let mut end = input.len();
    for (i, c) in input.char_indices() {
        if !c.is_ascii_digit() {
            end = i;
            break;
        }
    }
    input.split_at(end)
}

fn expect_char<'a>(
    input: &'a str,
    constant: char,
    error_message: &'static str,
) -> Result<&'a str, CalendarParseError> {
    if let Some(left) = input.strip_prefix(constant) {
        Ok(left)
    } else {
        Err(CalendarParseError::msg(error_message))
    }
}

fn ensure_complete<T>(
    input: &str,
    parse: impl FnOnce(&str) -> Result<(T, &str), CalendarParseError>,
) -> Result<T, CalendarParseError> {
    let (result, left) = parse(input)?;
    if !left.is_empty() {
        return Err(CalendarParseError::msg("unrecognized value suffix"));
    }
    Ok(result)
}

fn optional_end<T>(
    input: &str,
    parse: impl FnOnce(&str) -> Result<(T, &str), CalendarParseError>,
) -> Result<(Option<T>, &str), CalendarParseError> {
    Ok(if input.is_empty() {
        (None, input)
    } else {
        let (result, input) = parse(input)?;
        (Some(result), input)
    })
}

fn validate_day_of_month(year: &BigInt, month: u8, day: u8) -> Result<(), CalendarParseError> {
    if day > days_in_month(year, month) {
        return Err(CalendarParseError {
            kind: ParseErrorKind::InvalidDayOfMonth { day, month },
        });
    }
    Ok(())
}

fn days_in_month(year: &BigInt, month: u8) -> u8 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: &BigInt) -> bool {
    (year % 4_u32).is_zero() && (!(year % 100_u32).is_zero() || (year % 400_u32).is_zero())
}
