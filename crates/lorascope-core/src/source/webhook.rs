use serde::Deserialize;
use serde_json::Value;

use super::{SourceError, UplinkEvent};

pub(crate) const UNKNOWN_DEV_EUI: &str = "unknown";

#[derive(Debug, Default, Deserialize)]
struct WebhookRecord {
    #[serde(default)]
    end_device_ids: EndDeviceIds,
    #[serde(default)]
    uplink_message: UplinkMessage,
}

#[derive(Debug, Default, Deserialize)]
struct EndDeviceIds {
    dev_eui: Option<String>,
    device_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UplinkMessage {
    f_cnt: Option<Value>,
    f_port: Option<Value>,
    frm_payload: Option<String>,
    received_at: Option<String>,
    #[serde(default)]
    rx_metadata: Vec<RxMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct RxMetadata {
    rssi: Option<f64>,
    snr: Option<f64>,
}

pub(crate) fn parse_record(line: usize, text: &str) -> Result<UplinkEvent, SourceError> {
    let record: WebhookRecord =
        serde_json::from_str(text).map_err(|err| SourceError::Record {
            line,
            message: err.to_string(),
        })?;
    let WebhookRecord {
        end_device_ids,
        uplink_message,
    } = record;
    let gateway = uplink_message.rx_metadata.first();

    Ok(UplinkEvent {
        line,
        dev_eui: end_device_ids
            .dev_eui
            .filter(|eui| !eui.is_empty())
            .unwrap_or_else(|| UNKNOWN_DEV_EUI.to_string()),
        device_id: end_device_ids.device_id,
        f_cnt: uplink_message.f_cnt.as_ref().and_then(Value::as_u64),
        f_port: uplink_message.f_port.as_ref().and_then(Value::as_u64),
        frm_payload: uplink_message.frm_payload,
        received_at: uplink_message.received_at,
        rssi: gateway.and_then(|meta| meta.rssi),
        snr: gateway.and_then(|meta| meta.snr),
    })
}

#[cfg(test)]
mod tests {
    use super::parse_record;
    use crate::source::SourceError;

    #[test]
    fn parse_full_record() {
        let text = r#"{
            "end_device_ids": {"device_id": "sodaq-1", "dev_eui": "0004A30B00202875"},
            "uplink_message": {
                "f_port": 1,
                "f_cnt": 42,
                "frm_payload": "SEkhPwU=",
                "received_at": "2024-05-01T12:00:00.123456789Z",
                "rx_metadata": [{"rssi": -97, "snr": 8.25}, {"rssi": -120, "snr": -3}]
            }
        }"#;
        let event = parse_record(3, text).unwrap();
        assert_eq!(event.line, 3);
        assert_eq!(event.dev_eui, "0004A30B00202875");
        assert_eq!(event.device_id.as_deref(), Some("sodaq-1"));
        assert_eq!(event.f_cnt, Some(42));
        assert_eq!(event.f_port, Some(1));
        assert_eq!(event.frm_payload.as_deref(), Some("SEkhPwU="));
        assert_eq!(event.rssi, Some(-97.0));
        assert_eq!(event.snr, Some(8.25));
    }

    #[test]
    fn missing_fields_become_none() {
        let event = parse_record(1, "{}").unwrap();
        assert_eq!(event.dev_eui, "unknown");
        assert!(event.f_cnt.is_none());
        assert!(event.frm_payload.is_none());
        assert!(event.rssi.is_none());
    }

    #[test]
    fn non_integer_fcnt_is_treated_as_missing() {
        let text = r#"{"uplink_message": {"f_cnt": "7"}}"#;
        let event = parse_record(1, text).unwrap();
        assert!(event.f_cnt.is_none());
        let text = r#"{"uplink_message": {"f_cnt": -1}}"#;
        let event = parse_record(1, text).unwrap();
        assert!(event.f_cnt.is_none());
    }

    #[test]
    fn malformed_json_reports_line() {
        let err = parse_record(9, "{not json").unwrap_err();
        assert!(matches!(err, SourceError::Record { line: 9, .. }));
        assert!(err.to_string().contains("line 9"));
    }
}
