use thiserror::Error;

/// Errors returned by payload decoding.
///
/// # Examples
/// ```
/// use lorascope_core::DecodeError;
///
/// let err = DecodeError::InputTooShort { needed: 5, actual: 4 };
/// assert!(err.to_string().contains("input too short"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("input too short: need {needed} bytes, got {actual}")]
    InputTooShort { needed: usize, actual: usize },
    /// Raised while building an `UplinkInput` from untyped numbers, before
    /// any decoder runs. `value` is the number as written.
    #[error("invalid byte value at index {index}: {value} is not an integer in 0..=255")]
    InvalidByteValue { index: usize, value: String },
}
