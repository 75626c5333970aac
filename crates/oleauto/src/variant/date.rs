//! OLE automation dates
//!
//! A date travels as a day count from 1899-12-30 with the time of day in the
//! fraction. Before the epoch the fraction still counts forward from
//! midnight, so -1.25 is 1899-12-29 06:00.

use chrono::{DateTime, NaiveDateTime};

use crate::types::{Error, Result};

const MS_PER_DAY: i64 = 86_400_000;

/// Milliseconds between 1899-12-30 and 1970-01-01
const EPOCH_OFFSET_MS: i64 = 25_569 * MS_PER_DAY;

/// Day number of 0100-01-01
const MIN_DAY: i64 = -657_434;

/// Day number of 9999-12-31
const MAX_DAY: i64 = 2_958_465;

/// Convert to the wire date, rounding to the nearest millisecond
pub fn to_ole_date(value: &NaiveDateTime) -> Result<f64> {
    let utc = value.and_utc();
    let mut ms = utc.timestamp_millis() + EPOCH_OFFSET_MS;
    if utc.timestamp_subsec_nanos() % 1_000_000 >= 500_000 {
        ms += 1;
    }
    let day = ms.div_euclid(MS_PER_DAY);
    if !(MIN_DAY..=MAX_DAY).contains(&day) {
        return Err(Error::DateOutOfRange(value.to_string()));
    }

    let fraction = ms.rem_euclid(MS_PER_DAY) as f64 / MS_PER_DAY as f64;
    Ok(if day < 0 {
        day as f64 - fraction
    } else {
        day as f64 + fraction
    })
}

/// Convert from the wire date, rounding to milliseconds
pub fn from_ole_date(value: f64) -> Result<NaiveDateTime> {
    let out_of_range = || Error::DateOutOfRange(value.to_string());
    if !value.is_finite() {
        return Err(out_of_range());
    }

    let day = value.trunc();
    if day < MIN_DAY as f64 || day > MAX_DAY as f64 {
        return Err(out_of_range());
    }

    let fraction = (value - day).abs();
    let ms = day as i64 * MS_PER_DAY + (fraction * MS_PER_DAY as f64).round() as i64;
    DateTime::from_timestamp_millis(ms - EPOCH_OFFSET_MS)
        .map(|utc| utc.naive_utc())
        .ok_or_else(out_of_range)
}
