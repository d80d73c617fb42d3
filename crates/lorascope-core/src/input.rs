//! Uplink input in the host calling convention (`{ "bytes": [...] }`) and
//! the textual payload encodings accepted around it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;

use crate::decoders::{DecodeError, charset};

/// Errors returned while building an [`UplinkInput`] from text.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid hex payload: {0}")]
    Hex(String),
    #[error("invalid base64 payload: {0}")]
    Base64(String),
    #[error("invalid uplink JSON: {0}")]
    Json(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Raw uplink bytes handed to a decoder.
///
/// Deserializing validates every element against the byte range. Any JSON
/// number that is not an integer in 0..=255 is an `InvalidByteValue`.
///
/// # Examples
/// ```
/// use lorascope_core::{DecodeError, InputError, UplinkInput};
///
/// let input = UplinkInput::from_json_str(r#"{"bytes":[72,73,33,63,5]}"#)?;
/// assert_eq!(input.bytes, vec![72, 73, 33, 63, 5]);
///
/// let err = UplinkInput::from_json_str(r#"{"bytes":[72,73,33,63,256]}"#).unwrap_err();
/// assert!(matches!(
///     err,
///     InputError::Decode(DecodeError::InvalidByteValue { index: 4, .. })
/// ));
/// # Ok::<(), InputError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUplinkInput")]
pub struct UplinkInput {
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct RawUplinkInput {
    bytes: Vec<Number>,
}

impl TryFrom<RawUplinkInput> for UplinkInput {
    type Error = DecodeError;

    fn try_from(raw: RawUplinkInput) -> Result<Self, Self::Error> {
        UplinkInput::from_numbers(&raw.bytes)
    }
}

impl UplinkInput {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Build an input from untyped numbers, rejecting anything outside 0..=255.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidByteValue` for the first out-of-range value.
    pub fn from_values(values: &[i64]) -> Result<Self, DecodeError> {
        let bytes = values
            .iter()
            .enumerate()
            .map(|(index, value)| charset::byte_value(index, *value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bytes })
    }

    /// Build an input from JSON numbers, rejecting fractions and anything
    /// outside 0..=255.
    pub fn from_numbers(values: &[Number]) -> Result<Self, DecodeError> {
        let bytes = values
            .iter()
            .enumerate()
            .map(|(index, value)| charset::number_byte_value(index, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bytes })
    }

    /// Parse a hex payload; whitespace and a leading `0x` are ignored.
    ///
    /// # Examples
    /// ```
    /// use lorascope_core::UplinkInput;
    ///
    /// let input = UplinkInput::from_hex("0x48 49 21 3F 05")?;
    /// assert_eq!(input.bytes, vec![72, 73, 33, 63, 5]);
    /// # Ok::<(), lorascope_core::InputError>(())
    /// ```
    pub fn from_hex(text: &str) -> Result<Self, InputError> {
        let trimmed = text.trim();
        let trimmed = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let digits: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = hex::decode(digits).map_err(|err| InputError::Hex(err.to_string()))?;
        Ok(Self { bytes })
    }

    /// Parse a standard base64 payload, as carried in TTN `frm_payload`.
    ///
    /// # Examples
    /// ```
    /// use lorascope_core::UplinkInput;
    ///
    /// let input = UplinkInput::from_base64("SEkhPwU=")?;
    /// assert_eq!(input.bytes, vec![72, 73, 33, 63, 5]);
    /// # Ok::<(), lorascope_core::InputError>(())
    /// ```
    pub fn from_base64(text: &str) -> Result<Self, InputError> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|err| InputError::Base64(err.to_string()))?;
        Ok(Self { bytes })
    }

    /// Parse `{ "bytes": [...] }`, keeping byte range failures typed.
    pub fn from_json_str(text: &str) -> Result<Self, InputError> {
        let raw: RawUplinkInput =
            serde_json::from_str(text).map_err(|err| InputError::Json(err.to_string()))?;
        Ok(Self::from_numbers(&raw.bytes)?)
    }
}
