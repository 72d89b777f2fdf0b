//! Stateless value providers for primitive types and named domains.
//!
//! Every function draws from a caller-supplied random source and holds no
//! state of its own, so providers can be shared freely between the
//! cardinality-set pre-pass and the per-row resolver.

use chrono::{Datelike, NaiveDate};
use rand::Rng;

use rowforge_core::{Bounds, ColumnSpec, DATE_FORMAT, DataType, DomainClass, UUID_LENGTH_SENTINEL};

use crate::model::LetterCase;

pub mod reference;

const INT32_CEILING: i64 = i32::MAX as i64;
/// Longest decimal representation the high-magnitude path emits; 18
/// digits always fit an i64.
const MAX_DIGITS: usize = 18;

/// Bounded integer with magnitude-correct sampling.
///
/// Uniform sampling over a range that spans the 32/64-bit boundary would
/// land almost every draw in the high-magnitude end, so the range is
/// split into three regimes: direct sampling when max fits 32 bits, a
/// coin flip between the 32-bit-safe sub-range and the high-magnitude
/// path when the range straddles the boundary, and the high-magnitude
/// path alone when both bounds exceed 32 bits.
pub fn random_int(min: i64, max: i64, rng: &mut impl Rng) -> i64 {
    if min >= max {
        return min;
    }
    if max <= INT32_CEILING {
        return rng.random_range(min..=max);
    }
    if min <= INT32_CEILING && rng.random_bool(0.5) {
        return rng.random_range(min..=INT32_CEILING);
    }
    high_magnitude(min, rng)
}

/// Eight random bytes read as an unsigned 64-bit integer, truncated to a
/// decimal length drawn between the digit-length of `min` and 18.
fn high_magnitude(min: i64, rng: &mut impl Rng) -> i64 {
    let mut bytes = [0_u8; 8];
    rng.fill_bytes(&mut bytes);
    let digits = u64::from_be_bytes(bytes).to_string();

    let floor = decimal_digits(min).min(MAX_DIGITS);
    let length = if floor == MAX_DIGITS {
        MAX_DIGITS
    } else {
        rng.random_range(floor..=MAX_DIGITS)
    };

    digits[..digits.len().min(length)].parse().unwrap_or(min)
}

fn decimal_digits(value: i64) -> usize {
    value.unsigned_abs().to_string().len()
}

/// Bounded decimal: a magnitude-correct whole part plus a random
/// mantissa of the requested width.
pub fn random_decimal(min: i64, max: i64, mantissa: u8, rng: &mut impl Rng) -> String {
    let whole = random_int(min, max, rng);
    let mut fraction = String::with_capacity(usize::from(mantissa));
    for _ in 0..mantissa {
        fraction.push(char::from(b'0' + rng.random_range(0..10_u8)));
    }
    format!("{whole}.{fraction}")
}

/// Bounded date: uniform year, month constrained to the bounding years,
/// day capped at the month's length. Leap years are not modeled, so
/// February always caps at 28.
pub fn random_date(min: NaiveDate, max: NaiveDate, rng: &mut impl Rng) -> NaiveDate {
    let year = if min.year() == max.year() {
        min.year()
    } else {
        rng.random_range(min.year()..=max.year())
    };
    let month_lo = if year == min.year() { min.month() } else { 1 };
    let month_hi = if year == max.year() { max.month() } else { 12 };
    let month = if month_lo == month_hi {
        month_lo
    } else {
        rng.random_range(month_lo..=month_hi)
    };
    let day = rng.random_range(1..=days_in_month(month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(min)
}

fn days_in_month(month: u32) -> u32 {
    match month {
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Bounded-length string of uniformly sampled Latin letters.
pub fn random_string(min_len: usize, max_len: usize, case: LetterCase, rng: &mut impl Rng) -> String {
    let length = random_int(min_len as i64, max_len as i64, rng) as usize;
    let mut value = String::with_capacity(length);
    for _ in 0..length {
        let offset = rng.random_range(0..26_u8);
        let ch = match case {
            LetterCase::Lower => b'a' + offset,
            LetterCase::Upper => b'A' + offset,
            LetterCase::Mixed => {
                if rng.random_bool(0.5) {
                    b'a' + offset
                } else {
                    b'A' + offset
                }
            }
        };
        value.push(char::from(ch));
    }
    value
}

/// Random 128-bit token formatted as a canonical RFC 4122 v4 UUID.
pub fn random_uuid(rng: &mut impl Rng) -> String {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    uuid::Uuid::from_bytes(bytes).to_string()
}

/// Value from a named semantic domain, drawn from the bundled reference
/// lists.
pub fn domain_value(domain: DomainClass, rng: &mut impl Rng) -> String {
    match domain {
        DomainClass::None => String::new(),
        DomainClass::FirstName => pick(reference::FIRST_NAMES, rng).to_string(),
        DomainClass::LastName => pick(reference::LAST_NAMES, rng).to_string(),
        DomainClass::FullName => {
            let first = pick(reference::FIRST_NAMES, rng);
            let last = pick(reference::LAST_NAMES, rng);
            format!("{first} {last}")
        }
        DomainClass::StreetAddress => {
            let number = rng.random_range(1..=9999);
            let street = pick(reference::STREET_NAMES, rng);
            let suffix = pick(reference::STREET_SUFFIXES, rng);
            format!("{number} {street} {suffix}")
        }
        DomainClass::City => pick(reference::CITIES, rng).to_string(),
        DomainClass::State => pick(reference::STATES, rng).to_string(),
        DomainClass::Country => pick(reference::COUNTRIES, rng).to_string(),
        DomainClass::ZipCode => format!("{:05}", rng.random_range(0..100_000)),
        DomainClass::Ssn => {
            let mut area = rng.random_range(1..=899);
            if area == 666 {
                area = 667;
            }
            let group = rng.random_range(1..=99);
            let serial = rng.random_range(1..=9999);
            format!("{area:03}-{group:02}-{serial:04}")
        }
        DomainClass::Phone => {
            let area = rng.random_range(200..=989);
            let prefix = rng.random_range(200..=999);
            let line = rng.random_range(0..=9999);
            format!("({area}) {prefix}-{line:04}")
        }
    }
}

/// Number of distinct values a named domain can produce, when the domain
/// is backed by a finite reference list. Format-generated domains with a
/// large space report `None`.
pub fn domain_capacity(domain: DomainClass) -> Option<u64> {
    match domain {
        DomainClass::FirstName => Some(reference::FIRST_NAMES.len() as u64),
        DomainClass::LastName => Some(reference::LAST_NAMES.len() as u64),
        DomainClass::FullName => {
            Some((reference::FIRST_NAMES.len() * reference::LAST_NAMES.len()) as u64)
        }
        DomainClass::City => Some(reference::CITIES.len() as u64),
        DomainClass::State => Some(reference::STATES.len() as u64),
        DomainClass::Country => Some(reference::COUNTRIES.len() as u64),
        DomainClass::ZipCode => Some(100_000),
        _ => None,
    }
}

/// One value for a column from its domain or primitive bounds; the
/// shared entry point for the cardinality pre-pass and the row resolver.
pub fn column_value(column: &ColumnSpec, case: LetterCase, rng: &mut impl Rng) -> String {
    if column.domain.is_named() {
        return domain_value(column.domain, rng);
    }
    match (column.data_type, column.bounds) {
        (DataType::Integer, Some(Bounds::Int { min, max })) => random_int(min, max, rng).to_string(),
        (DataType::Decimal, Some(Bounds::Decimal { min, max })) => {
            random_decimal(min, max, column.mantissa, rng)
        }
        (DataType::Date, Some(Bounds::Date { min, max })) => {
            random_date(min, max, rng).format(DATE_FORMAT).to_string()
        }
        (DataType::String, Some(Bounds::Len { min, max })) => {
            if min == UUID_LENGTH_SENTINEL && max == UUID_LENGTH_SENTINEL {
                random_uuid(rng)
            } else {
                random_string(min, max, case, rng)
            }
        }
        _ => String::new(),
    }
}

fn pick<'a>(values: &[&'a str], rng: &mut impl Rng) -> &'a str {
    values[rng.random_range(0..values.len())]
}
