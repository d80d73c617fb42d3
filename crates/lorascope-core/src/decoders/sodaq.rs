use super::error::DecodeError;
use super::layout;
use super::reader::PayloadReader;
use crate::{Count, DecodedOutput};

/// Decode a Sodaq payload: 4 text bytes followed by a count sequence.
///
/// Every byte after the text is kept in order; a 4-byte payload yields an
/// empty sequence.
///
/// # Examples
/// ```
/// use lorascope_core::{Count, decode_sodaq};
///
/// let output = decode_sodaq(&[72, 73, 33, 63, 5, 6, 7])?;
/// assert_eq!(output.data.text, "HI!?");
/// assert_eq!(output.data.count, Count::Sequence(vec![5, 6, 7]));
/// # Ok::<(), lorascope_core::DecodeError>(())
/// ```
///
/// # Errors
/// Returns `DecodeError::InputTooShort` for payloads under 4 bytes.
pub fn decode_sodaq(payload: &[u8]) -> Result<DecodedOutput, DecodeError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::SODAQ_MIN_LEN)?;

    let text = reader.read_latin1(layout::TEXT_RANGE.clone())?;
    let count = reader.read_tail(layout::COUNT_SEQUENCE_START)?.to_vec();

    Ok(DecodedOutput::new(text, Count::Sequence(count)))
}
