//! Helpers shared by the repository implementations.

use chrono::{NaiveDateTime, Timelike, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a decimal column stored as TEXT, falling back to zero.
///
/// Amounts are written with `Decimal::to_string`, so a parse failure means
/// the row was edited by hand.
pub fn parse_decimal(value: &str, field_name: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or_else(|e| {
        log::error!(
            "Failed to parse {} '{}' as a decimal: {}. Using 0.",
            field_name,
            value,
            e
        );
        Decimal::ZERO
    })
}

/// Parses an enum column, logging and falling back to the default.
pub fn parse_enum<T>(value: &str, field_name: &str) -> T
where
    T: FromStr<Err = String> + Default,
{
    T::from_str(value).unwrap_or_else(|e| {
        log::error!("Invalid {} '{}': {}", field_name, value, e);
        T::default()
    })
}

/// Current UTC time at microsecond precision.
pub fn now() -> NaiveDateTime {
    let timestamp = Utc::now().naive_utc();
    let micros = timestamp.nanosecond() / 1_000 * 1_000;
    timestamp.with_nanosecond(micros).unwrap_or(timestamp)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
