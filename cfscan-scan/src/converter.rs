//! Text-to-binary conversion of cell values.
//!
//! Column-family stores hold every value as bytes; tables mapped onto them
//! store the textual form. [`TextConverter`] parses that text according to the
//! slot type's canonical grammar and reports malformed input as a
//! [`ConversionError`] instead of failing the scan.

use std::num::IntErrorKind;
use std::str::FromStr;

use cfscan_types::{ConversionError, SlotType};
use time::{Date, Month, PrimitiveDateTime, Time};

/// A converted value, borrowed from the raw input or the converter's scratch
/// buffer when it is variable length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotValue<'a> {
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    String(&'a [u8]),
    /// Nanoseconds since the Unix epoch.
    Timestamp(i64),
}

/// Converts raw cell text into slot values.
///
/// Holds no state besides configuration and a scratch buffer that is reused
/// for unescaping strings.
#[derive(Debug, Default)]
pub struct TextConverter {
    escape_char: Option<u8>,
    scratch: Vec<u8>,
}

impl TextConverter {
    pub fn new(escape_char: Option<u8>) -> Self {
        Self {
            escape_char,
            scratch: Vec::new(),
        }
    }

    pub fn convert<'a>(
        &'a mut self,
        raw: &'a [u8],
        target: SlotType,
    ) -> Result<SlotValue<'a>, ConversionError> {
        self.convert_with(raw, target, true)
    }

    /// Convert a row key. String slots receive the key bytes verbatim; the
    /// escape character only applies to cell values.
    pub fn convert_row_key<'a>(
        &'a mut self,
        raw: &'a [u8],
        target: SlotType,
    ) -> Result<SlotValue<'a>, ConversionError> {
        self.convert_with(raw, target, false)
    }

    fn convert_with<'a>(
        &'a mut self,
        raw: &'a [u8],
        target: SlotType,
        unescape: bool,
    ) -> Result<SlotValue<'a>, ConversionError> {
        match target {
            SlotType::String => self.convert_string(raw, unescape),
            SlotType::Boolean => parse_bool(as_text(raw, target)?).map(SlotValue::Boolean),
            SlotType::TinyInt => {
                parse_int::<i8>(as_text(raw, target)?, target).map(SlotValue::TinyInt)
            }
            SlotType::SmallInt => {
                parse_int::<i16>(as_text(raw, target)?, target).map(SlotValue::SmallInt)
            }
            SlotType::Int => {
                parse_int::<i32>(as_text(raw, target)?, target).map(SlotValue::Int)
            }
            SlotType::BigInt => {
                parse_int::<i64>(as_text(raw, target)?, target).map(SlotValue::BigInt)
            }
            SlotType::Float => {
                let text = as_text(raw, target)?;
                let value = parse_float::<f32>(text, target)?;
                if value.is_infinite() && !names_infinity(text) {
                    return Err(overflow(text, target));
                }
                Ok(SlotValue::Float(value))
            }
            SlotType::Double => {
                let text = as_text(raw, target)?;
                let value = parse_float::<f64>(text, target)?;
                if value.is_infinite() && !names_infinity(text) {
                    return Err(overflow(text, target));
                }
                Ok(SlotValue::Double(value))
            }
            SlotType::Timestamp => {
                parse_timestamp_nanos(as_text(raw, target)?).map(SlotValue::Timestamp)
            }
        }
    }

    fn convert_string<'a>(
        &'a mut self,
        raw: &'a [u8],
        unescape: bool,
    ) -> Result<SlotValue<'a>, ConversionError> {
        if raw.len() > u32::MAX as usize {
            return Err(ConversionError::Overflow {
                target: SlotType::String,
                text: format!("<{} bytes>", raw.len()),
            });
        }
        let Some(escape) = self.escape_char.filter(|_| unescape) else {
            return Ok(SlotValue::String(raw));
        };
        if !raw.contains(&escape) {
            return Ok(SlotValue::String(raw));
        }

        self.scratch.clear();
        let mut bytes = raw.iter().copied();
        while let Some(byte) = bytes.next() {
            if byte == escape {
                // A trailing escape has nothing to escape and is kept as is.
                self.scratch.push(bytes.next().unwrap_or(escape));
            } else {
                self.scratch.push(byte);
            }
        }
        Ok(SlotValue::String(&self.scratch))
    }
}

/// Text of a fixed-width value; empty input never parses.
fn as_text(raw: &[u8], target: SlotType) -> Result<&str, ConversionError> {
    if raw.is_empty() {
        return Err(ConversionError::Empty { target });
    }
    std::str::from_utf8(raw).map_err(|_| ConversionError::InvalidUtf8 { target })
}

fn malformed(text: &str, target: SlotType) -> ConversionError {
    ConversionError::Malformed {
        target,
        text: text.to_string(),
    }
}

fn overflow(text: &str, target: SlotType) -> ConversionError {
    ConversionError::Overflow {
        target,
        text: text.to_string(),
    }
}

fn parse_bool(text: &str) -> Result<bool, ConversionError> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(malformed(text, SlotType::Boolean))
    }
}

fn parse_int<T>(text: &str, target: SlotType) -> Result<T, ConversionError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    text.parse::<T>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => overflow(text, target),
        IntErrorKind::Empty => ConversionError::Empty { target },
        _ => malformed(text, target),
    })
}

fn parse_float<T>(text: &str, target: SlotType) -> Result<T, ConversionError>
where
    T: FromStr<Err = std::num::ParseFloatError>,
{
    text.parse::<T>().map_err(|_| malformed(text, target))
}

fn names_infinity(text: &str) -> bool {
    let digits = text.trim_start_matches(['+', '-']);
    digits.eq_ignore_ascii_case("inf") || digits.eq_ignore_ascii_case("infinity")
}

/// Parse `YYYY-MM-DD[( |T)HH:MM:SS[.fffffffff]]` as UTC into nanoseconds since
/// the Unix epoch.
pub fn parse_timestamp_nanos(text: &str) -> Result<i64, ConversionError> {
    let target = SlotType::Timestamp;
    let (date_part, time_part) = match text.find([' ', 'T']) {
        Some(idx) => (&text[..idx], Some(&text[idx + 1..])),
        None => (text, None),
    };

    let date = parse_date(date_part).ok_or_else(|| malformed(text, target))?;
    let time = match time_part {
        Some(part) => parse_time(part).ok_or_else(|| malformed(text, target))?,
        None => Time::MIDNIGHT,
    };

    let nanos = PrimitiveDateTime::new(date, time)
        .assume_utc()
        .unix_timestamp_nanos();
    i64::try_from(nanos).map_err(|_| overflow(text, target))
}

fn parse_date(text: &str) -> Option<Date> {
    let mut parts = text.split('-');
    let year_str = parts.next()?;
    let month_str = parts.next()?;
    let day_str = parts.next()?;
    if parts.next().is_some()
        || year_str.len() != 4
        || month_str.len() != 2
        || day_str.len() != 2
    {
        return None;
    }
    let year = parse_digits(year_str)? as i32;
    let month = Month::try_from(parse_digits(month_str)? as u8).ok()?;
    let day = parse_digits(day_str)? as u8;
    Date::from_calendar_date(year, month, day).ok()
}

fn parse_time(text: &str) -> Option<Time> {
    let (hms, fraction) = match text.split_once('.') {
        Some((hms, fraction)) => (hms, Some(fraction)),
        None => (text, None),
    };
    let mut parts = hms.split(':');
    let hour_str = parts.next()?;
    let minute_str = parts.next()?;
    let second_str = parts.next()?;
    if parts.next().is_some()
        || hour_str.len() != 2
        || minute_str.len() != 2
        || second_str.len() != 2
    {
        return None;
    }

    let nanos = match fraction {
        Some(digits) if !digits.is_empty() && digits.len() <= 9 => {
            parse_digits(digits)? * 10u32.pow(9 - digits.len() as u32)
        }
        Some(_) => return None,
        None => 0,
    };
    Time::from_hms_nano(
        parse_digits(hour_str)? as u8,
        parse_digits(minute_str)? as u8,
        parse_digits(second_str)? as u8,
        nanos,
    )
    .ok()
}

/// Parse an ASCII digit run of at most nine digits.
fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(raw: &str, target: SlotType) -> Result<SlotValue<'static>, ConversionError> {
        let mut converter = TextConverter::default();
        // Only fixed-width results are returned from this helper.
        converter.convert(raw.as_bytes(), target).map(|value| match value {
            SlotValue::String(_) => panic!("use convert_string for strings"),
            SlotValue::Boolean(v) => SlotValue::Boolean(v),
            SlotValue::TinyInt(v) => SlotValue::TinyInt(v),
            SlotValue::SmallInt(v) => SlotValue::SmallInt(v),
            SlotValue::Int(v) => SlotValue::Int(v),
            SlotValue::BigInt(v) => SlotValue::BigInt(v),
            SlotValue::Float(v) => SlotValue::Float(v),
            SlotValue::Double(v) => SlotValue::Double(v),
            SlotValue::Timestamp(v) => SlotValue::Timestamp(v),
        })
    }

    #[test]
    fn integers_respect_width() {
        assert_eq!(convert("42", SlotType::Int), Ok(SlotValue::Int(42)));
        assert_eq!(convert("-128", SlotType::TinyInt), Ok(SlotValue::TinyInt(-128)));
        assert_eq!(convert("+7", SlotType::SmallInt), Ok(SlotValue::SmallInt(7)));
        assert_eq!(
            convert("9223372036854775807", SlotType::BigInt),
            Ok(SlotValue::BigInt(i64::MAX))
        );
        assert!(matches!(
            convert("128", SlotType::TinyInt),
            Err(ConversionError::Overflow { .. })
        ));
        assert!(matches!(
            convert("-40000", SlotType::SmallInt),
            Err(ConversionError::Overflow { .. })
        ));
        assert!(matches!(
            convert("bad", SlotType::Int),
            Err(ConversionError::Malformed { target: SlotType::Int, .. })
        ));
        assert!(matches!(
            convert(" 1", SlotType::Int),
            Err(ConversionError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_input_fails_for_non_string_types() {
        for target in [SlotType::Boolean, SlotType::Int, SlotType::Double, SlotType::Timestamp] {
            assert_eq!(convert("", target), Err(ConversionError::Empty { target }));
        }
    }

    #[test]
    fn booleans_are_case_insensitive_words() {
        assert_eq!(convert("TRUE", SlotType::Boolean), Ok(SlotValue::Boolean(true)));
        assert_eq!(convert("false", SlotType::Boolean), Ok(SlotValue::Boolean(false)));
        assert!(convert("1", SlotType::Boolean).is_err());
    }

    #[test]
    fn floats_distinguish_overflow_from_infinity() {
        assert_eq!(convert("1.5", SlotType::Double), Ok(SlotValue::Double(1.5)));
        assert_eq!(convert("-2.5e3", SlotType::Float), Ok(SlotValue::Float(-2500.0)));
        assert_eq!(
            convert("-inf", SlotType::Double),
            Ok(SlotValue::Double(f64::NEG_INFINITY))
        );
        assert!(matches!(
            convert("1e40", SlotType::Float),
            Err(ConversionError::Overflow { .. })
        ));
        assert!(matches!(
            convert("1.2.3", SlotType::Double),
            Err(ConversionError::Malformed { .. })
        ));
    }

    #[test]
    fn timestamps_parse_date_time_and_fraction() {
        assert_eq!(
            convert("1970-01-01", SlotType::Timestamp),
            Ok(SlotValue::Timestamp(0))
        );
        assert_eq!(
            convert("1970-01-02 00:00:01.5", SlotType::Timestamp),
            Ok(SlotValue::Timestamp(86_401_500_000_000))
        );
        assert_eq!(
            convert("1969-12-31T23:59:59", SlotType::Timestamp),
            Ok(SlotValue::Timestamp(-1_000_000_000))
        );
        for bad in ["2024-02-30", "2024-1-01", "2024-01-01 25:00:00", "2024-01-01 10:00"] {
            assert!(
                matches!(convert(bad, SlotType::Timestamp), Err(ConversionError::Malformed { .. })),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn strings_pass_through_or_unescape() {
        let mut plain = TextConverter::default();
        assert_eq!(plain.convert(b"", SlotType::String), Ok(SlotValue::String(b"")));
        assert_eq!(
            plain.convert(b"a\\,b", SlotType::String),
            Ok(SlotValue::String(b"a\\,b"))
        );

        let mut escaping = TextConverter::new(Some(b'\\'));
        assert_eq!(
            escaping.convert(b"a\\,b\\\\c\\", SlotType::String),
            Ok(SlotValue::String(b"a,b\\c\\"))
        );
        assert_eq!(
            escaping.convert(b"plain", SlotType::String),
            Ok(SlotValue::String(b"plain"))
        );
    }

    #[test]
    fn row_keys_skip_unescaping() {
        let mut escaping = TextConverter::new(Some(b'\\'));
        assert_eq!(
            escaping.convert_row_key(b"k\\1", SlotType::String),
            Ok(SlotValue::String(b"k\\1"))
        );
        assert_eq!(
            escaping.convert_row_key(b"17", SlotType::Int),
            Ok(SlotValue::Int(17))
        );
        assert_eq!(
            escaping.convert(b"k\\1", SlotType::String),
            Ok(SlotValue::String(b"k1"))
        );
    }

    #[test]
    fn invalid_utf8_is_reported_for_typed_slots() {
        let mut converter = TextConverter::default();
        assert_eq!(
            converter.convert(&[0xff, 0xfe], SlotType::Int),
            Err(ConversionError::InvalidUtf8 { target: SlotType::Int })
        );
        assert_eq!(
            converter.convert(&[0xff, 0xfe], SlotType::String),
            Ok(SlotValue::String(&[0xff, 0xfe]))
        );
    }
}
