//! Uplink payload decoders.
//!
//! Each decoder follows the same layered structure:
//! - `layout`: byte offsets and minimum lengths (source of truth)
//! - `reader`: bounds-checked byte access
//! - `charset`: byte-to-character convention for payload text
//! - `error`: explicit, actionable errors
//!
//! Decoders are pure and contain no I/O. Both layouts start with four Latin-1
//! text bytes; Heltec payloads carry one count byte after the text, Sodaq
//! payloads carry every remaining byte as a count sequence.

pub mod charset;
pub mod error;
pub mod heltec;
pub mod layout;
pub mod reader;
pub mod sodaq;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DecodedOutput, UplinkInput};

pub use error::DecodeError;
pub use heltec::decode_heltec;
pub use sodaq::decode_sodaq;

/// Payload layout used to decode an uplink.
///
/// # Examples
/// ```
/// use lorascope_core::DecoderKind;
///
/// let kind: DecoderKind = "sodaq".parse()?;
/// assert_eq!(kind, DecoderKind::Sodaq);
/// assert_eq!(kind.min_len(), 4);
/// # Ok::<(), lorascope_core::ParseDecoderKindError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    /// Four text bytes and a single count byte.
    #[default]
    Heltec,
    /// Four text bytes and a trailing count sequence.
    Sodaq,
}

impl DecoderKind {
    pub const ALL: [DecoderKind; 2] = [DecoderKind::Heltec, DecoderKind::Sodaq];

    pub fn name(self) -> &'static str {
        match self {
            DecoderKind::Heltec => "heltec",
            DecoderKind::Sodaq => "sodaq",
        }
    }

    /// Smallest payload the decoder accepts.
    pub fn min_len(self) -> usize {
        match self {
            DecoderKind::Heltec => layout::HELTEC_MIN_LEN,
            DecoderKind::Sodaq => layout::SODAQ_MIN_LEN,
        }
    }

    pub fn decode(self, payload: &[u8]) -> Result<DecodedOutput, DecodeError> {
        match self {
            DecoderKind::Heltec => decode_heltec(payload),
            DecoderKind::Sodaq => decode_sodaq(payload),
        }
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown decoder '{0}' (expected heltec or sodaq)")]
pub struct ParseDecoderKindError(pub String);

impl FromStr for DecoderKind {
    type Err = ParseDecoderKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DecoderKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseDecoderKindError(value.to_string()))
    }
}

/// Decode an uplink in the host calling convention.
///
/// # Examples
/// ```
/// use lorascope_core::{DecodeError, DecoderKind, UplinkInput, decode_uplink};
///
/// let input = UplinkInput::new(vec![72, 73, 33, 63]);
/// let err = decode_uplink(DecoderKind::Heltec, &input).unwrap_err();
/// assert_eq!(err, DecodeError::InputTooShort { needed: 5, actual: 4 });
/// ```
///
/// # Errors
/// Returns `DecodeError::InputTooShort` when the payload is shorter than
/// [`DecoderKind::min_len`].
pub fn decode_uplink(kind: DecoderKind, input: &UplinkInput) -> Result<DecodedOutput, DecodeError> {
    kind.decode(&input.bytes)
}

#[cfg(test)]
mod tests {
    use super::{DecoderKind, decode_uplink};
    use crate::{Count, UplinkInput};

    #[test]
    fn kind_round_trips_through_names() {
        for kind in DecoderKind::ALL {
            assert_eq!(kind.name().parse::<DecoderKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.name());
        }
        assert_eq!("HELTEC".parse::<DecoderKind>(), Ok(DecoderKind::Heltec));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "lora".parse::<DecoderKind>().unwrap_err();
        assert!(err.to_string().contains("unknown decoder 'lora'"));
    }

    #[test]
    fn kind_serializes_lowercase() {
        let value = serde_json::to_value(DecoderKind::Sodaq).unwrap();
        assert_eq!(value, "sodaq");
    }

    #[test]
    fn boundary_at_four_bytes() {
        let input = UplinkInput::new(vec![72, 73, 33, 63]);
        assert!(decode_uplink(DecoderKind::Heltec, &input).is_err());
        let output = decode_uplink(DecoderKind::Sodaq, &input).unwrap();
        assert_eq!(output.data.count, Count::Sequence(vec![]));
    }

    #[test]
    fn variants_agree_on_text() {
        let input = UplinkInput::new(vec![0x41, 0xE9, 0x20, 0x7A, 9, 8]);
        let heltec = decode_uplink(DecoderKind::Heltec, &input).unwrap();
        let sodaq = decode_uplink(DecoderKind::Sodaq, &input).unwrap();
        assert_eq!(heltec.data.text, sodaq.data.text);
        assert_eq!(heltec.data.text, "Aé z");
    }
}
