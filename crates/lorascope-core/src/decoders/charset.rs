//! Byte value and character conventions for payload text.
//!
//! Text bytes are Latin-1: every value in 0..=255 maps to the code point of
//! the same number, so 0x80..=0xFF become U+0080..U+00FF instead of being
//! rejected. Only numbers outside the byte range are invalid.

use serde_json::Number;

use super::error::DecodeError;

/// Map a single payload byte to its Latin-1 character.
pub fn latin1_char(byte: u8) -> char {
    char::from(byte)
}

/// Validate an untyped numeric value as a payload byte.
pub fn byte_value(index: usize, value: i64) -> Result<u8, DecodeError> {
    u8::try_from(value).map_err(|_| DecodeError::InvalidByteValue {
        index,
        value: value.to_string(),
    })
}

/// Validate a JSON number as a payload byte. Integral floats such as `1e2`
/// are accepted; fractions and anything out of range are not.
pub fn number_byte_value(index: usize, value: &Number) -> Result<u8, DecodeError> {
    let byte = match value.as_u64() {
        Some(int) => u8::try_from(int).ok(),
        None => value
            .as_f64()
            .filter(|float| float.fract() == 0.0 && (0.0..=255.0).contains(float))
            .map(|float| float as u8),
    };
    byte.ok_or_else(|| DecodeError::InvalidByteValue {
        index,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Number;

    use super::{byte_value, latin1_char, number_byte_value};
    use crate::decoders::DecodeError;

    fn number(text: &str) -> Number {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn ascii_bytes_map_to_ascii() {
        assert_eq!(latin1_char(b'H'), 'H');
        assert_eq!(latin1_char(0), '\0');
    }

    #[test]
    fn high_bytes_map_to_latin1() {
        assert_eq!(latin1_char(0xE9), 'é');
        assert_eq!(latin1_char(0xFF), 'ÿ');
        assert_eq!(u32::from(latin1_char(0x80)), 0x80);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(byte_value(0, 255), Ok(255));
        assert_eq!(
            byte_value(3, 256),
            Err(DecodeError::InvalidByteValue {
                index: 3,
                value: "256".to_string()
            })
        );
        assert_eq!(
            byte_value(1, -1),
            Err(DecodeError::InvalidByteValue {
                index: 1,
                value: "-1".to_string()
            })
        );
    }

    #[test]
    fn json_numbers_must_be_integral_bytes() {
        assert_eq!(number_byte_value(0, &number("200")), Ok(200));
        assert_eq!(number_byte_value(0, &number("1e2")), Ok(100));
        assert_eq!(number_byte_value(0, &number("255.0")), Ok(255));

        for text in ["5.5", "1e3", "-3", "-0.5", "18446744073709551616"] {
            let err = number_byte_value(2, &number(text)).unwrap_err();
            assert!(
                matches!(err, DecodeError::InvalidByteValue { index: 2, .. }),
                "{text} should be rejected"
            );
        }
    }
}
