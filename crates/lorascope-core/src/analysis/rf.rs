use super::AnalysisOptions;
use super::alerts::AlertKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RfQuality {
    VeryPoor,
    Low,
    Fair,
    Good,
}

impl RfQuality {
    pub(crate) fn alert(self) -> Option<AlertKind> {
        match self {
            RfQuality::VeryPoor => Some(AlertKind::RfVeryPoor),
            RfQuality::Low => Some(AlertKind::RfLow),
            RfQuality::Fair | RfQuality::Good => None,
        }
    }

    pub(crate) fn is_poor(self) -> bool {
        matches!(self, RfQuality::VeryPoor | RfQuality::Low)
    }
}

/// Classify first-gateway RF metadata; `None` when neither value is present.
pub(crate) fn classify_rf(
    rssi: Option<f64>,
    snr: Option<f64>,
    options: &AnalysisOptions,
) -> Option<RfQuality> {
    if rssi.is_none() && snr.is_none() {
        return None;
    }
    let rssi_below = |limit: f64| rssi.is_some_and(|value| value < limit);
    let snr_below = |limit: f64| snr.is_some_and(|value| value < limit);

    if rssi_below(options.rssi_bad) || snr_below(options.snr_bad) {
        return Some(RfQuality::VeryPoor);
    }
    if rssi_below(options.rssi_low) || snr_below(options.snr_low) {
        return Some(RfQuality::Low);
    }
    match (rssi, snr) {
        (Some(rssi), Some(snr)) if rssi > options.rssi_good && snr > options.snr_good => {
            Some(RfQuality::Good)
        }
        _ => Some(RfQuality::Fair),
    }
}
