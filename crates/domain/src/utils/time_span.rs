//! Serialization helpers for the server's time-span wire format
//!
//! Durations travel as `[d.]hh:mm:ss[.fffffff]` strings (seven fractional
//! digits, i.e. 100 ns ticks), e.g. `00:00:01`, `1.00:00:00` or
//! `00:00:00.5000000`.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

const NANOS_PER_TICK: u32 = 100;
const SECS_PER_DAY: u64 = 86_400;

/// Format a duration as a time-span string.
pub fn format(duration: &Duration) -> String {
    let total = duration.as_secs();
    let days = total / SECS_PER_DAY;
    let hours = (total % SECS_PER_DAY) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let ticks = duration.subsec_nanos() / NANOS_PER_TICK;

    let mut text = if days > 0 {
        format!("{days}.{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    };

    if ticks > 0 {
        text.push_str(&format!(".{ticks:07}"));
    }

    text
}

/// Parse a time-span string. Negative spans are rejected.
pub fn parse(text: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid time span: {text:?}");

    if text.starts_with('-') {
        return Err(format!("negative time span not supported: {text:?}"));
    }

    let mut parts = text.split(':');
    let (head, minutes, rest) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(head), Some(minutes), Some(rest), None) => (head, minutes, rest),
        _ => return Err(invalid()),
    };

    let (days, hours) = match head.split_once('.') {
        Some((days, hours)) => (days.parse::<u64>().map_err(|_| invalid())?, hours),
        None => (0, head),
    };
    let hours = hours.parse::<u64>().map_err(|_| invalid())?;
    let minutes = minutes.parse::<u64>().map_err(|_| invalid())?;

    let (seconds, fraction) = match rest.split_once('.') {
        Some((seconds, fraction)) => (seconds, Some(fraction)),
        None => (rest, None),
    };
    let seconds = seconds.parse::<u64>().map_err(|_| invalid())?;

    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    let nanos = match fraction {
        Some(digits) if digits.is_empty() || digits.len() > 7 => return Err(invalid()),
        Some(digits) => {
            let ticks = digits.parse::<u32>().map_err(|_| invalid())?;
            let scale = 10u32.pow(7 - digits.len() as u32);
            ticks * scale * NANOS_PER_TICK
        }
        None => 0,
    };

    let secs = days * SECS_PER_DAY + hours * 3_600 + minutes * 60 + seconds;
    Ok(Duration::new(secs, nanos))
}

/// Serialize a Duration as a time-span string
pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(duration))
}

/// Deserialize a time-span string into a Duration
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(serde::de::Error::custom)
}
