use crate::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// The built-in YANG types a leaf value is checked against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafType {
    /// `string`
    String,
    /// `boolean`
    Boolean,
    /// `int8`
    Int8,
    /// `int16`
    Int16,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `uint8`
    Uint8,
    /// `uint16`
    Uint16,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
    /// `decimal64` with the given number of fraction digits.
    Decimal64 {
        /// `fraction-digits`, 1 to 18.
        fraction_digits: u8,
    },
    /// `enumeration` with the given enum names.
    Enumeration(Vec<String>),
    /// `empty`
    Empty,
    /// `ietf-yang-types:date-and-time`
    DateAndTime,
}

impl LeafType {
    /// Parse the lexical representation `text` into a [`Value`].
    ///
    /// Strings are taken verbatim. Every other type ignores leading and
    /// trailing XML whitespace. On failure the returned string says what was
    /// wrong with `text`.
    pub fn parse(&self, text: &str) -> Result<Value, String> {
        let raw = text;
        let text = text.trim_matches([' ', '\t', '\r', '\n']);
        match self {
            LeafType::String => Ok(Value::String(raw.to_owned())),
            LeafType::Boolean => match text {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err("expected true or false".to_owned()),
            },
            LeafType::Int8 => signed(text, i8::MIN.into(), i8::MAX.into()),
            LeafType::Int16 => signed(text, i16::MIN.into(), i16::MAX.into()),
            LeafType::Int32 => signed(text, i32::MIN.into(), i32::MAX.into()),
            LeafType::Int64 => signed(text, i64::MIN, i64::MAX),
            LeafType::Uint8 => unsigned(text, u8::MAX.into()),
            LeafType::Uint16 => unsigned(text, u16::MAX.into()),
            LeafType::Uint32 => unsigned(text, u32::MAX.into()),
            LeafType::Uint64 => unsigned(text, u64::MAX),
            LeafType::Decimal64 { fraction_digits } => decimal(text, *fraction_digits),
            LeafType::Enumeration(names) => {
                if names.iter().any(|name| name == text) {
                    Ok(Value::Enumeration(text.to_owned()))
                } else {
                    Err(format!("expected one of {}", names.join(", ")))
                }
            }
            LeafType::Empty => {
                if text.is_empty() {
                    Ok(Value::Empty)
                } else {
                    Err("type empty carries no value".to_owned())
                }
            }
            LeafType::DateAndTime => OffsetDateTime::parse(text, &Rfc3339)
                .map(|_| Value::String(text.to_owned()))
                .map_err(|err| format!("not an RFC 3339 date-and-time: {}", err)),
        }
    }
}

fn signed(text: &str, min: i64, max: i64) -> Result<Value, String> {
    let value: i64 = text.parse().map_err(|_| "not an integer".to_owned())?;
    if value < min || value > max {
        return Err(format!("out of range {}..{}", min, max));
    }
    Ok(Value::Int(value))
}

fn unsigned(text: &str, max: u64) -> Result<Value, String> {
    let value: u64 = text
        .parse()
        .map_err(|_| "not an unsigned integer".to_owned())?;
    if value > max {
        return Err(format!("out of range 0..{}", max));
    }
    Ok(Value::Uint(value))
}

fn decimal(text: &str, fraction_digits: u8) -> Result<Value, String> {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let valid = !integer.is_empty()
        && digits(integer)
        && digits(fraction)
        && (fraction.len() <= usize::from(fraction_digits))
        && !(unsigned.contains('.') && fraction.is_empty());

    if !valid {
        return Err(format!(
            "not a decimal64 with at most {} fraction digits",
            fraction_digits
        ));
    }

    Ok(Value::Decimal(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(LeafType::Int8.parse("-128"), Ok(Value::Int(-128)));
        assert!(LeafType::Int8.parse("128").is_err());
        assert_eq!(LeafType::Uint16.parse("65535"), Ok(Value::Uint(65535)));
        assert!(LeafType::Uint16.parse("-1").is_err());
        assert!(LeafType::Int32.parse("12a").is_err());
    }

    #[test]
    fn decimal64() {
        let ty = LeafType::Decimal64 { fraction_digits: 2 };
        assert_eq!(ty.parse("-3.14"), Ok(Value::Decimal("-3.14".to_owned())));
        assert_eq!(ty.parse("42"), Ok(Value::Decimal("42".to_owned())));
        assert!(ty.parse("3.141").is_err());
        assert!(ty.parse("3.").is_err());
        assert!(ty.parse(".5").is_err());
    }

    #[test]
    fn enumeration_and_empty() {
        let ty = LeafType::Enumeration(vec!["white-bread".to_owned(), "wheat-bread".to_owned()]);
        assert!(ty.parse("wheat-bread").is_ok());
        assert!(ty.parse("rye").is_err());

        assert_eq!(LeafType::Empty.parse(""), Ok(Value::Empty));
        assert!(LeafType::Empty.parse("x").is_err());
    }

    #[test]
    fn surrounding_whitespace() {
        assert_eq!(LeafType::String.parse(" a\t"), Ok(Value::String(" a\t".to_owned())));
        assert_eq!(LeafType::Uint8.parse("\n  7\n"), Ok(Value::Uint(7)));
        assert_eq!(LeafType::Boolean.parse(" true "), Ok(Value::Boolean(true)));
        assert_eq!(LeafType::Empty.parse("\n"), Ok(Value::Empty));
        assert!(LeafType::Uint8.parse("7 7").is_err());
    }

    #[test]
    fn date_and_time() {
        assert_eq!(
            LeafType::DateAndTime.parse("2020-09-03T16:20:00Z"),
            Ok(Value::String("2020-09-03T16:20:00Z".to_owned()))
        );
        assert!(LeafType::DateAndTime.parse("2020-09-03T16:20:00+02:00").is_ok());
        assert!(LeafType::DateAndTime.parse("yesterday").is_err());
    }
}
