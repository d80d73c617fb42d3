use crate::decoders::DecoderKind;
use crate::{DecodedOutput, UplinkInput};

use super::alerts::AlertKind;

/// Shortest trimmed text that is not flagged as too short.
pub(crate) const MIN_TEXT_CHARS: usize = 3;

/// Previous decoded payload of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PayloadState {
    pub text: String,
    pub counter: Option<u8>,
}

pub(crate) fn decode_frm_payload(
    frm_payload: Option<&str>,
    decoder: DecoderKind,
) -> Result<DecodedOutput, AlertKind> {
    let encoded = frm_payload
        .filter(|encoded| !encoded.trim().is_empty())
        .ok_or(AlertKind::PayloadEmpty)?;
    let input = UplinkInput::from_base64(encoded).map_err(|_| AlertKind::PayloadBase64)?;
    if input.bytes.is_empty() {
        return Err(AlertKind::PayloadEmpty);
    }
    decoder
        .decode(&input.bytes)
        .map_err(|_| AlertKind::PayloadDecode)
}

/// Compare a decoded payload with the previous one from the same device.
pub(crate) fn check_progression(
    previous: &PayloadState,
    current: &PayloadState,
    same_fcnt: bool,
) -> Vec<AlertKind> {
    let mut alerts = Vec::new();
    if previous == current {
        alerts.push(if same_fcnt {
            AlertKind::PayloadDuplicate
        } else {
            AlertKind::PayloadRepeated
        });
    }
    if let (Some(prev), Some(counter)) = (previous.counter, current.counter) {
        if counter == prev {
            alerts.push(AlertKind::CounterUnchanged);
        } else if counter < prev {
            alerts.push(AlertKind::CounterDecreased);
        }
    }
    alerts
}

pub(crate) fn check_text(text: &str) -> Option<AlertKind> {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if trimmed.is_empty() {
        Some(AlertKind::TextEmpty)
    } else if trimmed.chars().count() < MIN_TEXT_CHARS {
        Some(AlertKind::TextShort)
    } else {
        None
    }
}
