use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::AnalysisOptions;
use super::alerts::AlertKind;

/// Intervals under this many seconds look like duplicates.
pub(crate) const TOO_FAST_S: f64 = 1.0;
/// Allowed deviation from the expected interval before an info alert.
pub(crate) const NOMINAL_TOLERANCE_S: f64 = 2.0;

pub(crate) fn parse_received_at(raw: Option<&str>) -> Result<OffsetDateTime, AlertKind> {
    let raw = raw
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or(AlertKind::TimeMissing)?;
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|_| AlertKind::TimeInvalid)
}

pub(crate) fn check_interval(interval_s: f64, options: &AnalysisOptions) -> Option<AlertKind> {
    if interval_s < TOO_FAST_S {
        return Some(AlertKind::TimeTooFast);
    }
    if interval_s > options.max_time_gap_s {
        return Some(AlertKind::TimeLongDelay);
    }
    if (interval_s - options.expected_interval_s).abs() > NOMINAL_TOLERANCE_S {
        return Some(AlertKind::TimeOffNominal);
    }
    None
}

pub(crate) fn format_rfc3339(ts: Option<OffsetDateTime>) -> Option<String> {
    ts.and_then(|ts| ts.format(&Rfc3339).ok())
}
