//! Uplink record sources.
//!
//! Sources own all file I/O and hand the analysis layer one normalized
//! [`UplinkEvent`] per recorded TTN webhook.

mod jsonl;
mod webhook;

pub use jsonl::JsonLinesSource;

use thiserror::Error;

/// One recorded uplink, normalized from a TTN v3 webhook body.
#[derive(Debug, Clone, PartialEq)]
pub struct UplinkEvent {
    /// 1-based line number of the record in its source.
    pub line: usize,
    pub dev_eui: String,
    pub device_id: Option<String>,
    /// Frame counter; `None` when absent or not a non-negative integer.
    pub f_cnt: Option<u64>,
    pub f_port: Option<u64>,
    /// Base64 application payload.
    pub frm_payload: Option<String>,
    /// Network server receive time, as recorded.
    pub received_at: Option<String>,
    /// RSSI of the first gateway, in dBm.
    pub rssi: Option<f64>,
    /// SNR of the first gateway, in dB.
    pub snr: Option<f64>,
}

pub trait UplinkSource {
    fn next_uplink(&mut self) -> Result<Option<UplinkEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid uplink record at line {line}: {message}")]
    Record { line: usize, message: String },
}
