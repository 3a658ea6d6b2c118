//! Physical units and calendars.
//!
//! Unit strings follow a udunits-style grammar:
//! - products of symbols with optional integer exponents (`m s-1`, `kg m-2 s-1`,
//!   `m^2`, `m**2`, `W/m2`, `m.s-1`)
//! - numeric scale factors (`0.001`, `1e-3`, `1`)
//! - the special units `unknown` and `no_unit`
//! - time references `<interval> since <epoch>`
//!
//! Only time references carry a calendar.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, Result};

/// CF calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Calendar {
    Standard,
    Gregorian,
    ProlepticGregorian,
    #[serde(rename = "noleap")]
    NoLeap,
    #[serde(rename = "365_day")]
    Day365,
    AllLeap,
    #[serde(rename = "366_day")]
    Day366,
    #[serde(rename = "360_day")]
    Day360,
    Julian,
    None,
}

impl Calendar {
    pub const ALL: [Calendar; 10] = [
        Calendar::Standard,
        Calendar::Gregorian,
        Calendar::ProlepticGregorian,
        Calendar::NoLeap,
        Calendar::Day365,
        Calendar::AllLeap,
        Calendar::Day366,
        Calendar::Day360,
        Calendar::Julian,
        Calendar::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Calendar::Standard => "standard",
            Calendar::Gregorian => "gregorian",
            Calendar::ProlepticGregorian => "proleptic_gregorian",
            Calendar::NoLeap => "noleap",
            Calendar::Day365 => "365_day",
            Calendar::AllLeap => "all_leap",
            Calendar::Day366 => "366_day",
            Calendar::Day360 => "360_day",
            Calendar::Julian => "julian",
            Calendar::None => "none",
        }
    }

    /// Whether dates in this calendar are real Gregorian dates.
    pub fn is_gregorian(&self) -> bool {
        matches!(
            self,
            Calendar::Standard | Calendar::Gregorian | Calendar::ProlepticGregorian
        )
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Calendar {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let lower = s.trim().to_lowercase();
        Calendar::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("unknown calendar '{}'", s))
    }
}

const SPECIAL_UNITS: &[&str] = &["unknown", "no_unit", "no unit"];

const TIME_SYMBOLS: &[&str] = &[
    "s", "sec", "secs", "second", "seconds", "min", "mins", "minute", "minutes", "h", "hr",
    "hrs", "hour", "hours", "d", "day", "days", "week", "weeks", "month", "months", "yr",
    "year", "years", "common_year", "common_years",
];

const SYMBOLS: &[&str] = &[
    // Base and derived SI
    "m", "g", "s", "K", "A", "mol", "cd", "rad", "sr", "Hz", "N", "Pa", "J", "W", "C", "V",
    "F", "ohm", "S", "Wb", "T", "H", "lm", "lx", "Bq", "Gy", "Sv", "kat", "L", "l", "t",
    "bar", "atm", "degC", "degF", "degK", "deg", "percent", "%", "ppm", "ppb", "ppt",
    "ppmv", "ppbv", "dB", "kt", "knot", "knots", "mi", "ft", "in", "hectare", "Dobson",
    "DU", "psu", "PSU", "mmHg", "cal", "erg", "dyn", "gal", "Gal", "eV",
    // Names
    "meter", "metre", "gram", "kelvin", "ampere", "mole", "candela", "radian", "steradian",
    "hertz", "newton", "pascal", "joule", "watt", "coulomb", "volt", "farad", "siemens",
    "weber", "tesla", "henry", "lumen", "lux", "becquerel", "gray", "sievert", "liter",
    "litre", "tonne", "celsius", "fahrenheit", "degree", "mile", "foot", "feet", "inch",
    "decibel", "sverdrup",
    // Angles and positions
    "degree_north", "degree_N", "degreeN", "degree_east", "degree_E", "degreeE",
    "degree_south", "degree_S", "degree_west", "degree_W", "degree_true",
    "degrees_north", "degrees_N", "degrees_east", "degrees_E", "degrees_south",
    "degrees_west", "degrees_true", "degrees",
];

const PREFIXES: &[&str] = &[
    "yotta", "zetta", "exa", "peta", "tera", "giga", "mega", "kilo", "hecto", "deka", "deca",
    "deci", "centi", "milli", "micro", "nano", "pico", "femto", "atto", "zepto", "yocto", "da",
    "Y", "Z", "E", "P", "T", "G", "M", "k", "h", "d", "c", "m", "u", "µ", "n", "p", "f", "a",
    "z", "y",
];

fn is_known_symbol(symbol: &str, table: &[&str]) -> bool {
    let known = |s: &str| {
        table.contains(&s) || (s.len() > 1 && s.ends_with('s') && table.contains(&&s[..s.len() - 1]))
    };
    if known(symbol) {
        return true;
    }
    PREFIXES
        .iter()
        .any(|p| symbol.len() > p.len() && symbol.starts_with(p) && known(&symbol[p.len()..]))
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '%' || c == '°'
}

/// Check one factor of a product, e.g. `m`, `s-1`, `m^2`, `0.001`.
fn check_term(term: &str) -> std::result::Result<(), String> {
    if term.parse::<f64>().is_ok() {
        return Ok(());
    }
    let split = term
        .char_indices()
        .find(|(_, c)| !is_symbol_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(term.len());
    let (symbol, exponent) = term.split_at(split);
    if symbol.is_empty() {
        return Err(format!("'{}' is not a unit symbol", term));
    }
    if !is_known_symbol(symbol, SYMBOLS) && !is_known_symbol(symbol, TIME_SYMBOLS) {
        return Err(format!("unknown unit symbol '{}'", symbol));
    }
    let digits = exponent.strip_prefix('^').unwrap_or(exponent);
    let digits = digits
        .strip_prefix('-')
        .or_else(|| digits.strip_prefix('+'))
        .unwrap_or(digits);
    if !exponent.is_empty() && (digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit())) {
        return Err(format!("invalid exponent '{}' in '{}'", exponent, term));
    }
    Ok(())
}

/// Check a product/quotient expression such as `kg m-2 s-1` or `W/m2`.
fn check_product(expr: &str) -> std::result::Result<(), String> {
    let expr = expr.replace("**", "^");
    let chars: Vec<char> = expr.chars().collect();
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut expect_term = false;

    for (i, &c) in chars.iter().enumerate() {
        let between_digits = i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).map_or(false, |n| n.is_ascii_digit());
        let is_operator = c == '*' || c == '/' || (c == '.' && !between_digits);
        if c.is_whitespace() || is_operator {
            if !current.is_empty() {
                terms.push(std::mem::take(&mut current));
                expect_term = false;
            }
            if is_operator {
                if terms.is_empty() || expect_term {
                    return Err(format!("dangling operator '{}'", c));
                }
                expect_term = true;
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        terms.push(current);
        expect_term = false;
    }
    if expect_term {
        return Err("expression ends with an operator".to_string());
    }
    if terms.is_empty() {
        return Err("empty unit".to_string());
    }
    terms.iter().try_for_each(|t| check_term(t))
}

/// Parse the `<epoch>` part of a time reference.
///
/// Returns `Some` with the epoch when it is a valid Gregorian date-time;
/// non-Gregorian calendars only require plausible field ranges.
fn parse_epoch(
    epoch: &str,
    calendar: Calendar,
) -> std::result::Result<Option<NaiveDateTime>, String> {
    let trimmed = epoch.trim();
    let trimmed = ["UTC", "utc", "GMT", "Z", "z"]
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix))
        .unwrap_or(trimmed)
        .trim_end();
    let trimmed = trimmed
        .strip_suffix("+00:00")
        .or_else(|| trimmed.strip_suffix("+0:00"))
        .unwrap_or(trimmed)
        .trim_end();

    let (date, time) = match trimmed.split_once(|c: char| c == ' ' || c == 'T') {
        Some((d, t)) => (d, Some(t.trim())),
        None => (trimmed, None),
    };

    let invalid = || format!("invalid epoch '{}'", epoch);
    let mut parts = date.splitn(3, '-');
    let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let month: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(1);
    let day: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(1);
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }

    let (mut hour, mut minute, mut second) = (0u32, 0u32, 0f64);
    if let Some(time) = time.filter(|t| !t.is_empty()) {
        let mut fields = time.splitn(3, ':');
        hour = fields.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        minute = match fields.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };
        second = match fields.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0.0,
        };
        if hour > 23 || minute > 59 || !(0.0..60.0).contains(&second) {
            return Err(invalid());
        }
    }

    if !calendar.is_gregorian() {
        return Ok(None);
    }
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
    let whole = second.trunc() as u32;
    let nanos = ((second - second.trunc()) * 1e9).round() as u32;
    let time = NaiveTime::from_hms_nano_opt(hour, minute, whole, nanos.min(999_999_999))
        .ok_or_else(invalid)?;
    Ok(Some(NaiveDateTime::new(date, time)))
}

/// Split `<interval> since <epoch>` into its two halves.
fn split_time_reference(definition: &str) -> Option<(&str, &str)> {
    const SINCE: &str = " since ";
    let at = definition.char_indices().map(|(i, _)| i).find(|&i| {
        definition
            .get(i..i + SINCE.len())
            .map_or(false, |window| window.eq_ignore_ascii_case(SINCE))
    })?;
    Some((&definition[..at], &definition[at + SINCE.len()..]))
}

/// A physical unit with an optional calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit {
    definition: String,
    calendar: Option<Calendar>,
}

impl Unit {
    /// Parse a unit. Time references get the `standard` calendar.
    pub fn new(definition: impl Into<String>) -> Result<Self> {
        Self::build(definition.into(), None)
    }

    /// Parse a unit with an explicit calendar.
    ///
    /// The calendar is dropped for units that are not time references.
    pub fn with_calendar(definition: impl Into<String>, calendar: Calendar) -> Result<Self> {
        Self::build(definition.into(), Some(calendar))
    }

    /// The `unknown` unit.
    pub fn unknown() -> Self {
        Self {
            definition: "unknown".to_string(),
            calendar: None,
        }
    }

    /// Dimensionless unit `1`.
    pub fn dimensionless() -> Self {
        Self {
            definition: "1".to_string(),
            calendar: None,
        }
    }

    fn build(definition: String, calendar: Option<Calendar>) -> Result<Self> {
        let malformed = |message: String| CodecError::malformed_unit("unit", &definition, message);
        let trimmed = definition.trim();

        if SPECIAL_UNITS.contains(&trimmed.to_lowercase().as_str()) {
            return Ok(Self {
                definition,
                calendar: None,
            });
        }

        if let Some((interval, epoch)) = split_time_reference(trimmed) {
            let interval = interval.trim();
            let symbol =
                interval.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ' ');
            if !is_known_symbol(symbol, TIME_SYMBOLS) {
                return Err(malformed(format!("'{}' is not a time interval", interval)));
            }
            let calendar = calendar.unwrap_or(Calendar::Standard);
            parse_epoch(epoch, calendar).map_err(malformed)?;
            return Ok(Self {
                definition,
                calendar: Some(calendar),
            });
        }

        check_product(trimmed).map_err(malformed)?;
        Ok(Self {
            definition,
            calendar: None,
        })
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn calendar(&self) -> Option<Calendar> {
        self.calendar
    }

    pub fn is_time_reference(&self) -> bool {
        self.calendar.is_some()
    }

    pub fn is_unknown(&self) -> bool {
        self.definition.trim().eq_ignore_ascii_case("unknown")
    }

    /// The epoch of a time reference in a Gregorian calendar.
    pub fn epoch(&self) -> Option<NaiveDateTime> {
        let calendar = self.calendar?;
        let (_, epoch) = split_time_reference(self.definition.trim())?;
        parse_epoch(epoch, calendar).ok().flatten()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.definition)
    }
}

impl FromStr for Unit {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Unit::new(s)
    }
}
