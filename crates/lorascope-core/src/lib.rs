//! lorascope core library: LoRaWAN uplink payload decoding and offline
//! uplink analysis.
//!
//! The decoders turn the raw `bytes` of a TTN-style uplink into a
//! `{ data: { text, count } }` record. Two payload layouts are supported:
//! Heltec (4 text bytes and a single count byte) and Sodaq (4 text bytes and a
//! trailing count sequence). Decoding is byte-oriented, pure and side-effect
//! free; every read is bounds-checked and a short payload is rejected before
//! any field is produced.
//!
//! The analysis layer replays recorded TTN webhook uplinks (JSON Lines)
//! through a decoder and aggregates per-device sanity checks (frame counter,
//! timing, RF quality, payload progression) into a deterministic report. All
//! file I/O is isolated in `source`.
//!
//! Invariants:
//! - Decoder output is either complete or an error, never partial.
//! - Text bytes map to Latin-1 code points (0x00..=0xFF -> U+0000..U+00FF).
//! - Report ordering is stable across runs.
//!
//! # Examples
//! ```
//! use lorascope_core::{Count, DecoderKind, UplinkInput, decode_uplink};
//!
//! let input = UplinkInput::new(vec![72, 73, 33, 63, 5]);
//! let output = decode_uplink(DecoderKind::Heltec, &input)?;
//! assert_eq!(output.data.text, "HI!?");
//! assert_eq!(output.data.count, Count::Single(5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod decoders;
mod input;
mod source;

pub use analysis::{AnalysisError, AnalysisOptions, analyze_source, analyze_uplink_file};
pub use decoders::{
    DecodeError, DecoderKind, ParseDecoderKindError, decode_heltec, decode_sodaq, decode_uplink,
};
pub use input::{InputError, UplinkInput};
pub use source::{JsonLinesSource, SourceError, UplinkEvent, UplinkSource};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no uplink time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoder result in the host calling convention: `{ "data": { ... } }`.
///
/// # Examples
/// ```
/// use lorascope_core::{Count, DecodedOutput};
///
/// let output = DecodedOutput::new("HI!?".to_string(), Count::Sequence(vec![5, 6, 7]));
/// let json = serde_json::to_string(&output)?;
/// assert_eq!(json, r#"{"data":{"text":"HI!?","count":[5,6,7]}}"#);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedOutput {
    pub data: DecodedData,
}

impl DecodedOutput {
    pub fn new(text: String, count: Count) -> Self {
        Self {
            data: DecodedData { text, count },
        }
    }
}

/// Decoded payload fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedData {
    /// Four Latin-1 characters taken from the first payload bytes.
    pub text: String,
    /// Counter value(s) following the text.
    pub count: Count,
}

/// Counter field of a decoded payload.
///
/// Serialized untagged: a single integer for Heltec payloads, an array for
/// Sodaq payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Single(u8),
    Sequence(Vec<u8>),
}

impl Count {
    /// Counter value used for progression checks: the single count, or the
    /// last byte of a sequence.
    ///
    /// # Examples
    /// ```
    /// use lorascope_core::Count;
    ///
    /// assert_eq!(Count::Single(5).last(), Some(5));
    /// assert_eq!(Count::Sequence(vec![5, 6, 7]).last(), Some(7));
    /// assert_eq!(Count::Sequence(Vec::new()).last(), None);
    /// ```
    pub fn last(&self) -> Option<u8> {
        match self {
            Count::Single(value) => Some(*value),
            Count::Sequence(values) => values.last().copied(),
        }
    }
}

/// Aggregated uplink analysis report with deterministic ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input file metadata.
    pub input: InputInfo,
    /// Decoder applied to every uplink payload.
    pub decoder: DecoderKind,

    /// Optional capture summary (absent when no source was read).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Per-device summaries sorted by DevEUI.
    pub devices: Vec<DeviceSummary>,
    /// Alerts aggregated by id, sorted by severity then id.
    pub alerts: Vec<AlertSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input file metadata embedded in reports.
///
/// # Examples
/// ```
/// use lorascope_core::InputInfo;
///
/// let input = InputInfo {
///     path: "uplinks.jsonl".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Summary of the replayed uplink records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Records successfully read and analysed.
    pub uplinks_total: u64,
    /// Records skipped because they could not be parsed.
    pub records_skipped: u64,
    /// RFC3339 timestamp of the earliest uplink (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the latest uplink (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Per-device metrics summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Device EUI as reported by the network server (`unknown` when absent).
    pub dev_eui: String,
    /// Application-level device id, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Number of uplinks analysed for this device.
    pub uplinks: u64,
    /// First valid frame counter observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcnt_first: Option<u64>,
    /// Last valid frame counter observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcnt_last: Option<u64>,
    /// Uplinks repeating the previous frame counter.
    pub duplicates: u64,
    /// Frame counters skipped by forward gaps.
    pub missed_uplinks: u64,
    /// Mean interval between timestamped uplinks, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_interval_s: Option<f64>,
    /// Mean RSSI of the first gateway, in dBm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi_avg: Option<f64>,
    /// Mean SNR of the first gateway, in dB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snr_avg: Option<f64>,
    /// Share of uplinks with low or very poor RF (0.0-100.0).
    pub poor_rf_pct: f64,
    /// Share of uplinks with good RF (0.0-100.0).
    pub good_rf_pct: f64,
    /// Uplinks whose payload could not be decoded.
    pub decode_errors: u64,
    /// Most recent successfully decoded payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_decoded: Option<DecodedData>,
}

/// Alert severity, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Alerts of one kind aggregated over the whole input.
///
/// # Examples
/// ```
/// use lorascope_core::{AlertSummary, Severity};
///
/// let alert = AlertSummary {
///     id: "UL-FCNT-GAP".to_string(),
///     severity: Severity::Warning,
///     message: "Frame counter gap".to_string(),
///     count: 1,
///     examples: vec!["0004A30B00202875 fcnt=12 @ 2024-05-01T12:00:00Z".to_string()],
/// };
/// assert_eq!(alert.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSummary {
    /// Stable alert identifier (e.g., `UL-FCNT-GAP`).
    pub id: String,
    pub severity: Severity,
    /// Human-readable message explaining the alert.
    pub message: String,
    /// Number of uplinks that raised this alert.
    pub count: u64,
    /// At most three example contexts, formatted as `dev_eui fcnt=N @ ts`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use lorascope_core::{DecoderKind, make_stub_report};
///
/// let report = make_stub_report("uplinks.jsonl", 123, DecoderKind::Sodaq);
/// assert_eq!(report.report_version, lorascope_core::REPORT_VERSION);
/// assert!(report.devices.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64, decoder: DecoderKind) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "lorascope".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        decoder,
        capture_summary: None,
        devices: vec![],
        alerts: vec![],
    }
}
