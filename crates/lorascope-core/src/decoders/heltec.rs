use super::error::DecodeError;
use super::layout;
use super::reader::PayloadReader;
use crate::{Count, DecodedOutput};

/// Decode a Heltec payload: 4 text bytes followed by one count byte.
///
/// Bytes after the count byte are ignored.
///
/// # Examples
/// ```
/// use lorascope_core::{Count, decode_heltec};
///
/// let output = decode_heltec(&[72, 73, 33, 63, 5])?;
/// assert_eq!(output.data.text, "HI!?");
/// assert_eq!(output.data.count, Count::Single(5));
/// # Ok::<(), lorascope_core::DecodeError>(())
/// ```
///
/// # Errors
/// Returns `DecodeError::InputTooShort` for payloads under 5 bytes.
pub fn decode_heltec(payload: &[u8]) -> Result<DecodedOutput, DecodeError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::HELTEC_MIN_LEN)?;

    let text = reader.read_latin1(layout::TEXT_RANGE.clone())?;
    let count = reader.read_u8(layout::COUNT_OFFSET)?;

    Ok(DecodedOutput::new(text, Count::Single(count)))
}
