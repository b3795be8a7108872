//! Date and time payloads for `@...@` elements.

use crate::{Error, Result};
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta,
};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One of the date/time shapes a date element can hold.
///
/// Parsing tries, in order: an RFC 3339 timestamp, a timestamp without
/// offset, a time of day, a calendar date, then a time span
/// (`[-][d.]hh:mm:ss[.fraction]`).
///
/// # Examples
///
/// ```rust
/// use xferlang::DateTimeValue;
///
/// let when: DateTimeValue = "2025-08-12T10:15:30.0000000Z".parse().unwrap();
/// assert!(matches!(when, DateTimeValue::DateTime(_)));
/// assert_eq!(when.to_string(), "2025-08-12T10:15:30Z");
///
/// let span: DateTimeValue = "1.02:03:04".parse().unwrap();
/// assert!(matches!(span, DateTimeValue::Span(_)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum DateTimeValue {
    DateTime(DateTime<FixedOffset>),
    Local(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Span(TimeDelta),
}

impl DateTimeValue {
    pub fn kind(&self) -> &'static str {
        match self {
            DateTimeValue::DateTime(_) | DateTimeValue::Local(_) => "datetime",
            DateTimeValue::Date(_) => "date",
            DateTimeValue::Time(_) => "time",
            DateTimeValue::Span(_) => "timespan",
        }
    }

    /// Orders two values of the same shape; mixed shapes are unordered.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (DateTimeValue::DateTime(a), DateTimeValue::DateTime(b)) => Some(a.cmp(b)),
            (DateTimeValue::Local(a), DateTimeValue::Local(b)) => Some(a.cmp(b)),
            (DateTimeValue::DateTime(a), DateTimeValue::Local(b)) => Some(a.naive_utc().cmp(b)),
            (DateTimeValue::Local(a), DateTimeValue::DateTime(b)) => Some(a.cmp(&b.naive_utc())),
            (DateTimeValue::Date(a), DateTimeValue::Date(b)) => Some(a.cmp(b)),
            (DateTimeValue::Time(a), DateTimeValue::Time(b)) => Some(a.cmp(b)),
            (DateTimeValue::Span(a), DateTimeValue::Span(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl FromStr for DateTimeValue {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let text = text.trim();
        if let Ok(value) = DateTime::parse_from_rfc3339(text) {
            return Ok(DateTimeValue::DateTime(value));
        }
        if let Ok(value) = NaiveDateTime::parse_from_str(text, NAIVE_DATETIME_FORMAT) {
            return Ok(DateTimeValue::Local(value));
        }
        if let Ok(value) = NaiveTime::parse_from_str(text, TIME_FORMAT) {
            return Ok(DateTimeValue::Time(value));
        }
        if let Ok(value) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
            return Ok(DateTimeValue::Date(value));
        }
        parse_span(text)
            .map(DateTimeValue::Span)
            .ok_or_else(|| Error::invalid_value("date", text))
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeValue::DateTime(value) => {
                f.write_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            DateTimeValue::Local(value) => write!(f, "{}", value.format(NAIVE_DATETIME_FORMAT)),
            DateTimeValue::Date(value) => write!(f, "{}", value.format(DATE_FORMAT)),
            DateTimeValue::Time(value) => write!(f, "{}", value.format(TIME_FORMAT)),
            DateTimeValue::Span(value) => f.write_str(&format_span(value)),
        }
    }
}

fn parse_span(text: &str) -> Option<TimeDelta> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (days, clock) = match body.find(':') {
        Some(colon) => match body[..colon].find('.') {
            Some(dot) => (body[..dot].parse::<i64>().ok()?, &body[dot + 1..]),
            None => (0, body),
        },
        None => return days_only(negative, body),
    };

    let mut parts = clock.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let (seconds, nanos) = match parts.next() {
        Some(seconds) => parse_seconds(seconds)?,
        None => (0, 0),
    };
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let total = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes * 60 + seconds)?;
    let span = TimeDelta::try_seconds(total)?.checked_add(&TimeDelta::nanoseconds(nanos))?;
    Some(if negative { -span } else { span })
}

fn days_only(negative: bool, body: &str) -> Option<TimeDelta> {
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let span = TimeDelta::try_days(body.parse().ok()?)?;
    Some(if negative { -span } else { span })
}

fn parse_seconds(text: &str) -> Option<(i64, i64)> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let seconds = whole.parse().ok()?;
    if fraction.is_empty() {
        return Some((seconds, 0));
    }
    if fraction.len() > 9 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let nanos = format!("{:0<9}", fraction).parse().ok()?;
    Some((seconds, nanos))
}

// The day component is always written so a span never reads back as a time of day.
fn format_span(span: &TimeDelta) -> String {
    let negative = *span < TimeDelta::zero();
    let magnitude = span.abs();
    let total = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();
    let mut text = format!(
        "{}{}.{:02}:{:02}:{:02}",
        if negative { "-" } else { "" },
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60
    );
    if nanos != 0 {
        let fraction = format!("{:09}", nanos);
        text.push('.');
        text.push_str(fraction.trim_end_matches('0'));
    }
    text
}
