use std::collections::HashMap;

use time::OffsetDateTime;

use crate::{DecodedData, DeviceSummary};

use super::payload::PayloadState;
use super::rf::RfQuality;

#[derive(Debug, Default)]
pub(crate) struct DeviceStats {
    pub device_id: Option<String>,
    pub uplinks: u64,
    pub fcnt_first: Option<u64>,
    pub last_fcnt: Option<u64>,
    pub duplicates: u64,
    pub missed_uplinks: u64,
    pub last_time: Option<OffsetDateTime>,
    pub interval_total_s: f64,
    pub intervals: u64,
    pub rssi_total: f64,
    pub rssi_samples: u64,
    pub snr_total: f64,
    pub snr_samples: u64,
    pub poor_rf: u64,
    pub good_rf: u64,
    pub decode_errors: u64,
    pub last_payload: Option<PayloadState>,
    pub last_decoded: Option<DecodedData>,
}

impl DeviceStats {
    pub(crate) fn add_rf(&mut self, rssi: Option<f64>, snr: Option<f64>, quality: Option<RfQuality>) {
        if let Some(rssi) = rssi {
            self.rssi_total += rssi;
            self.rssi_samples += 1;
        }
        if let Some(snr) = snr {
            self.snr_total += snr;
            self.snr_samples += 1;
        }
        match quality {
            Some(quality) if quality.is_poor() => self.poor_rf += 1,
            Some(RfQuality::Good) => self.good_rf += 1,
            _ => {}
        }
    }

    pub(crate) fn add_fcnt(&mut self, fcnt: Option<u64>) {
        if let Some(fcnt) = fcnt {
            self.fcnt_first.get_or_insert(fcnt);
            self.last_fcnt = Some(fcnt);
        }
    }
}

pub(crate) fn build_device_summaries(stats: HashMap<String, DeviceStats>) -> Vec<DeviceSummary> {
    let mut devices: Vec<DeviceSummary> = stats
        .into_iter()
        .map(|(dev_eui, stats)| DeviceSummary {
            dev_eui,
            device_id: stats.device_id,
            uplinks: stats.uplinks,
            fcnt_first: stats.fcnt_first,
            fcnt_last: stats.last_fcnt,
            duplicates: stats.duplicates,
            missed_uplinks: stats.missed_uplinks,
            avg_interval_s: mean(stats.interval_total_s, stats.intervals),
            rssi_avg: mean(stats.rssi_total, stats.rssi_samples),
            snr_avg: mean(stats.snr_total, stats.snr_samples),
            poor_rf_pct: percentage(stats.poor_rf, stats.uplinks),
            good_rf_pct: percentage(stats.good_rf, stats.uplinks),
            decode_errors: stats.decode_errors,
            last_decoded: stats.last_decoded,
        })
        .collect();

    devices.sort_by(|a, b| a.dev_eui.cmp(&b.dev_eui));
    devices
}

fn mean(total: f64, samples: u64) -> Option<f64> {
    if samples == 0 {
        return None;
    }
    Some(round2(total / samples as f64))
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(100.0 * part as f64 / whole as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
