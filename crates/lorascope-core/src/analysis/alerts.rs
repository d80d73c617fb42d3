use std::collections::HashMap;

use crate::source::UplinkEvent;
use crate::{AlertSummary, Severity};

pub(crate) const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AlertKind {
    FcntMissing,
    FcntOverflow,
    FcntRollover,
    FcntDuplicate,
    FcntBackwards,
    FcntGap,
    FcntLargeGap,
    TimeMissing,
    TimeInvalid,
    TimeTooFast,
    TimeLongDelay,
    TimeOffNominal,
    RfVeryPoor,
    RfLow,
    PayloadEmpty,
    PayloadBase64,
    PayloadDecode,
    PayloadDuplicate,
    PayloadRepeated,
    CounterUnchanged,
    CounterDecreased,
    TextEmpty,
    TextShort,
}

impl AlertKind {
    pub(crate) fn id(self) -> &'static str {
        match self {
            AlertKind::FcntMissing => "UL-FCNT-MISSING",
            AlertKind::FcntOverflow => "UL-FCNT-OVERFLOW",
            AlertKind::FcntRollover => "UL-FCNT-ROLLOVER",
            AlertKind::FcntDuplicate => "UL-FCNT-DUPLICATE",
            AlertKind::FcntBackwards => "UL-FCNT-BACKWARDS",
            AlertKind::FcntGap => "UL-FCNT-GAP",
            AlertKind::FcntLargeGap => "UL-FCNT-LARGE-GAP",
            AlertKind::TimeMissing => "UL-TIME-MISSING",
            AlertKind::TimeInvalid => "UL-TIME-INVALID",
            AlertKind::TimeTooFast => "UL-TIME-TOO-FAST",
            AlertKind::TimeLongDelay => "UL-TIME-LONG-DELAY",
            AlertKind::TimeOffNominal => "UL-TIME-OFF-NOMINAL",
            AlertKind::RfVeryPoor => "UL-RF-VERY-POOR",
            AlertKind::RfLow => "UL-RF-LOW",
            AlertKind::PayloadEmpty => "UL-PAYLOAD-EMPTY",
            AlertKind::PayloadBase64 => "UL-PAYLOAD-BASE64",
            AlertKind::PayloadDecode => "UL-PAYLOAD-DECODE",
            AlertKind::PayloadDuplicate => "UL-PAYLOAD-DUPLICATE",
            AlertKind::PayloadRepeated => "UL-PAYLOAD-REPEATED",
            AlertKind::CounterUnchanged => "UL-COUNTER-UNCHANGED",
            AlertKind::CounterDecreased => "UL-COUNTER-DECREASED",
            AlertKind::TextEmpty => "UL-TEXT-EMPTY",
            AlertKind::TextShort => "UL-TEXT-SHORT",
        }
    }

    pub(crate) fn severity(self) -> Severity {
        match self {
            AlertKind::FcntMissing
            | AlertKind::FcntOverflow
            | AlertKind::TimeMissing
            | AlertKind::TimeInvalid
            | AlertKind::PayloadEmpty
            | AlertKind::PayloadBase64
            | AlertKind::PayloadDecode => Severity::Error,
            AlertKind::FcntRollover | AlertKind::TimeOffNominal => Severity::Info,
            _ => Severity::Warning,
        }
    }

    pub(crate) fn message(self) -> &'static str {
        match self {
            AlertKind::FcntMissing => "Frame counter missing or not an integer",
            AlertKind::FcntOverflow => "Frame counter exceeds the 16-bit limit",
            AlertKind::FcntRollover => "Frame counter rollover",
            AlertKind::FcntDuplicate => "Duplicate frame counter",
            AlertKind::FcntBackwards => "Frame counter went backwards",
            AlertKind::FcntGap => "Frame counter gap",
            AlertKind::FcntLargeGap => "Large frame counter gap, potential loss",
            AlertKind::TimeMissing => "Uplink timestamp missing",
            AlertKind::TimeInvalid => "Uplink timestamp is not RFC 3339",
            AlertKind::TimeTooFast => "Uplink interval under one second",
            AlertKind::TimeLongDelay => "Uplink interval exceeds the maximum gap",
            AlertKind::TimeOffNominal => "Uplink interval off the nominal period",
            AlertKind::RfVeryPoor => "Very poor RF quality",
            AlertKind::RfLow => "Low RF quality",
            AlertKind::PayloadEmpty => "Payload empty",
            AlertKind::PayloadBase64 => "Payload is not valid base64",
            AlertKind::PayloadDecode => "Payload could not be decoded",
            AlertKind::PayloadDuplicate => "Exact duplicate payload and frame counter",
            AlertKind::PayloadRepeated => "Payload and counter repeated with a new frame counter",
            AlertKind::CounterUnchanged => "Payload counter unchanged",
            AlertKind::CounterDecreased => "Payload counter decreased",
            AlertKind::TextEmpty => "Decoded text empty",
            AlertKind::TextShort => "Decoded text shorter than 3 characters",
        }
    }
}

#[derive(Debug, Default)]
struct AlertEntry {
    count: u64,
    examples: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct AlertStore {
    entries: HashMap<AlertKind, AlertEntry>,
}

impl AlertStore {
    pub(crate) fn record(&mut self, kind: AlertKind, example: &str) {
        let entry = self.entries.entry(kind).or_default();
        entry.count += 1;
        if entry.examples.len() < MAX_EXAMPLES {
            entry.examples.push(example.to_string());
        }
    }

    pub(crate) fn into_summaries(self) -> Vec<AlertSummary> {
        let mut summaries: Vec<AlertSummary> = self
            .entries
            .into_iter()
            .map(|(kind, entry)| AlertSummary {
                id: kind.id().to_string(),
                severity: kind.severity(),
                message: kind.message().to_string(),
                count: entry.count,
                examples: entry.examples,
            })
            .collect();

        summaries.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.id.cmp(&b.id)));
        summaries
    }
}

/// Context line for an alert example: `dev_eui fcnt=N @ ts`.
pub(crate) fn format_example(event: &UplinkEvent) -> String {
    let fcnt = event
        .f_cnt
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string());
    let ts = event.received_at.as_deref().unwrap_or("-");
    format!("{} fcnt={} @ {}", event.dev_eui, fcnt, ts)
}
