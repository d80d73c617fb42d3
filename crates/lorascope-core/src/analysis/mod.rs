use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::decoders::DecoderKind;
use crate::source::{JsonLinesSource, SourceError, UplinkEvent, UplinkSource};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, Report, make_stub_report};

mod alerts;
mod devices;
mod fcnt;
mod payload;
mod rf;
mod timing;

use alerts::{AlertStore, format_example};
use devices::{DeviceStats, build_device_summaries};
use fcnt::check_fcnt;
use payload::{PayloadState, check_progression, check_text, decode_frm_payload};
use rf::classify_rf;
use timing::{check_interval, format_rfc3339, parse_received_at};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decoder choice and thresholds for the per-uplink checks.
///
/// # Examples
/// ```
/// use lorascope_core::{AnalysisOptions, DecoderKind};
///
/// let options = AnalysisOptions {
///     decoder: DecoderKind::Sodaq,
///     ..AnalysisOptions::default()
/// };
/// assert_eq!(options.expected_interval_s, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub decoder: DecoderKind,
    /// Nominal uplink period, in seconds.
    pub expected_interval_s: f64,
    /// Intervals above this many seconds raise a long-delay alert.
    pub max_time_gap_s: f64,
    /// Frame counter gaps above this raise a large-gap alert.
    pub max_fcnt_gap: u64,
    pub rssi_bad: f64,
    pub rssi_low: f64,
    pub rssi_good: f64,
    pub snr_bad: f64,
    pub snr_low: f64,
    pub snr_good: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            decoder: DecoderKind::Heltec,
            expected_interval_s: 10.0,
            max_time_gap_s: 20.0,
            max_fcnt_gap: 10,
            rssi_bad: -120.0,
            rssi_low: -115.0,
            rssi_good: -100.0,
            snr_bad: -15.0,
            snr_low: -10.0,
            snr_good: -5.0,
        }
    }
}

/// Analyse a JSON Lines file of recorded TTN uplink webhooks.
///
/// # Errors
/// Returns `AnalysisError` when the file cannot be opened or read. Records
/// that fail to parse are skipped and counted in the capture summary.
pub fn analyze_uplink_file(path: &Path, options: &AnalysisOptions) -> Result<Report, AnalysisError> {
    let source = JsonLinesSource::open(path)?;
    analyze_source(path, source, options)
}

pub fn analyze_source<S: UplinkSource>(
    path: &Path,
    source: S,
    options: &AnalysisOptions,
) -> Result<Report, AnalysisError> {
    let analysis = run_analysis(source, options)?;

    let mut report = make_stub_report(
        &path.display().to_string(),
        path.metadata()?.len(),
        options.decoder,
    );
    let time_start = format_rfc3339(analysis.first_ts);
    let time_end = format_rfc3339(analysis.last_ts);
    report.generated_at = time_end
        .clone()
        .or_else(|| time_start.clone())
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.capture_summary = Some(CaptureSummary {
        uplinks_total: analysis.uplinks_total,
        records_skipped: analysis.records_skipped,
        time_start,
        time_end,
    });
    report.devices = build_device_summaries(analysis.devices);
    report.alerts = analysis.alerts.into_summaries();
    Ok(report)
}

#[derive(Debug, Default)]
struct Analysis {
    uplinks_total: u64,
    records_skipped: u64,
    first_ts: Option<OffsetDateTime>,
    last_ts: Option<OffsetDateTime>,
    devices: HashMap<String, DeviceStats>,
    alerts: AlertStore,
}

fn run_analysis<S: UplinkSource>(
    mut source: S,
    options: &AnalysisOptions,
) -> Result<Analysis, AnalysisError> {
    let mut analysis = Analysis::default();
    loop {
        let event = match source.next_uplink() {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(SourceError::Record { line, message }) => {
                warn!(line, %message, "skipping uplink record");
                analysis.records_skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        analysis.uplinks_total += 1;
        let device = analysis.devices.entry(event.dev_eui.clone()).or_default();
        let ts = analyze_uplink(device, &mut analysis.alerts, &event, options);
        update_ts_bounds(&mut analysis.first_ts, &mut analysis.last_ts, ts);
    }
    Ok(analysis)
}

/// Run every check for one uplink against the device's previous state, then
/// advance that state. Returns the parsed uplink time.
fn analyze_uplink(
    device: &mut DeviceStats,
    alerts: &mut AlertStore,
    event: &UplinkEvent,
    options: &AnalysisOptions,
) -> Option<OffsetDateTime> {
    let mut raised = Vec::new();
    device.uplinks += 1;
    if device.device_id.is_none() {
        device.device_id = event.device_id.clone();
    }

    let fcnt = check_fcnt(device.last_fcnt, event.f_cnt, options.max_fcnt_gap);
    raised.extend(fcnt.alerts);
    device.missed_uplinks += fcnt.missed;
    if fcnt.duplicate {
        device.duplicates += 1;
    }

    let ts = match parse_received_at(event.received_at.as_deref()) {
        Ok(ts) => Some(ts),
        Err(alert) => {
            raised.push(alert);
            None
        }
    };
    if let (Some(ts), Some(last)) = (ts, device.last_time) {
        let interval_s = (ts - last).as_seconds_f64();
        device.interval_total_s += interval_s;
        device.intervals += 1;
        raised.extend(check_interval(interval_s, options));
    }

    let quality = classify_rf(event.rssi, event.snr, options);
    device.add_rf(event.rssi, event.snr, quality);
    raised.extend(quality.and_then(|quality| quality.alert()));

    match decode_frm_payload(event.frm_payload.as_deref(), options.decoder) {
        Ok(output) => {
            let data = output.data;
            let current = PayloadState {
                text: data.text.clone(),
                counter: data.count.last(),
            };
            let same_fcnt = event.f_cnt.is_some() && event.f_cnt == device.last_fcnt;
            if let Some(previous) = device.last_payload.as_ref() {
                raised.extend(check_progression(previous, &current, same_fcnt));
            }
            raised.extend(check_text(&data.text));
            debug!(
                dev_eui = %event.dev_eui,
                f_cnt = ?event.f_cnt,
                text = %data.text,
                counter = ?current.counter,
                "uplink decoded"
            );
            device.last_payload = Some(current);
            device.last_decoded = Some(data);
        }
        Err(alert) => {
            warn!(
                dev_eui = %event.dev_eui,
                line = event.line,
                alert = alert.id(),
                "uplink payload not decoded"
            );
            device.decode_errors += 1;
            raised.push(alert);
        }
    }

    device.add_fcnt(event.f_cnt);
    if ts.is_some() {
        device.last_time = ts;
    }

    let example = format_example(event);
    for alert in raised {
        alerts.record(alert, &example);
    }
    ts
}

fn update_ts_bounds(
    first: &mut Option<OffsetDateTime>,
    last: &mut Option<OffsetDateTime>,
    ts: Option<OffsetDateTime>,
) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{AnalysisOptions, run_analysis};
    use crate::decoders::DecoderKind;
    use crate::source::JsonLinesSource;
    use crate::{Count, Severity};

    fn record(dev_eui: &str, f_cnt: u64, payload: &str, ts: &str, rssi: f64, snr: f64) -> String {
        format!(
            r#"{{"end_device_ids":{{"dev_eui":"{dev_eui}"}},"uplink_message":{{"f_cnt":{f_cnt},"frm_payload":"{payload}","received_at":"{ts}","rx_metadata":[{{"rssi":{rssi},"snr":{snr}}}]}}}}"#
        )
    }

    fn analyse(lines: &[String], options: &AnalysisOptions) -> super::Analysis {
        let data = lines.join("\n");
        let source = JsonLinesSource::from_reader(Cursor::new(data));
        run_analysis(source, options).unwrap()
    }

    #[test]
    fn clean_sequence_has_no_alerts() {
        let lines = vec![
            record("A", 1, "SEkhPwE=", "2024-05-01T12:00:00Z", -90.0, 2.0),
            record("A", 2, "SEkhPwI=", "2024-05-01T12:00:10Z", -90.0, 2.0),
            record("A", 3, "SEkhPwM=", "2024-05-01T12:00:20Z", -90.0, 2.0),
        ];
        let analysis = analyse(&lines, &AnalysisOptions::default());
        assert_eq!(analysis.uplinks_total, 3);
        let device = &analysis.devices["A"];
        assert_eq!(device.uplinks, 3);
        assert_eq!(device.intervals, 2);
        assert_eq!(device.interval_total_s, 20.0);
        let last = device.last_decoded.as_ref().unwrap();
        assert_eq!(last.count, Count::Single(3));
        assert!(analysis.alerts.into_summaries().is_empty());
    }

    #[test]
    fn gap_and_duplicate_are_reported() {
        let lines = vec![
            record("A", 1, "SEkhPwE=", "2024-05-01T12:00:00Z", -90.0, 2.0),
            record("A", 4, "SEkhPwQ=", "2024-05-01T12:00:10Z", -90.0, 2.0),
            record("A", 4, "SEkhPwQ=", "2024-05-01T12:00:20Z", -90.0, 2.0),
        ];
        let analysis = analyse(&lines, &AnalysisOptions::default());
        let device = &analysis.devices["A"];
        assert_eq!(device.missed_uplinks, 2);
        assert_eq!(device.duplicates, 1);

        let summaries = analysis.alerts.into_summaries();
        let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "UL-COUNTER-UNCHANGED",
                "UL-FCNT-DUPLICATE",
                "UL-FCNT-GAP",
                "UL-PAYLOAD-DUPLICATE"
            ]
        );
        assert!(summaries.iter().all(|s| s.severity == Severity::Warning));
        assert_eq!(summaries[2].examples, vec!["A fcnt=4 @ 2024-05-01T12:00:10Z"]);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let lines = vec![
            "{broken".to_string(),
            record("A", 1, "SEkhPwE=", "2024-05-01T12:00:00Z", -90.0, 2.0),
        ];
        let analysis = analyse(&lines, &AnalysisOptions::default());
        assert_eq!(analysis.records_skipped, 1);
        assert_eq!(analysis.uplinks_total, 1);
    }

    #[test]
    fn decoder_choice_changes_decode_errors() {
        let lines = vec![record("A", 1, "SEkhPw==", "2024-05-01T12:00:00Z", -90.0, 2.0)];

        let heltec = analyse(&lines, &AnalysisOptions::default());
        assert_eq!(heltec.devices["A"].decode_errors, 1);

        let options = AnalysisOptions {
            decoder: DecoderKind::Sodaq,
            ..AnalysisOptions::default()
        };
        let sodaq = analyse(&lines, &options);
        assert_eq!(sodaq.devices["A"].decode_errors, 0);
        assert_eq!(
            sodaq.devices["A"].last_decoded.as_ref().unwrap().count,
            Count::Sequence(vec![])
        );
    }

    #[test]
    fn time_bounds_follow_parsed_timestamps() {
        let lines = vec![
            record("B", 1, "SEkhPwE=", "2024-05-01T12:00:30Z", -90.0, 2.0),
            record("A", 1, "SEkhPwE=", "2024-05-01T12:00:00Z", -90.0, 2.0),
            record("A", 2, "SEkhPwI=", "not a time", -90.0, 2.0),
        ];
        let analysis = analyse(&lines, &AnalysisOptions::default());
        assert_eq!(analysis.first_ts.unwrap().unix_timestamp(), 1_714_564_800);
        assert_eq!(analysis.last_ts.unwrap().unix_timestamp(), 1_714_564_830);
        assert_eq!(analysis.devices.len(), 2);
    }
}
