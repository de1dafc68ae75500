//! E2E tests for protocol types embedded in a reporter's own settings.

use serde::Deserialize;
use serde_json::json;

use dd_protocol::{
    KeyStyle, ReportFormat, ReportKey, ReportResponse, TopicVariant, match_topic, response_topics,
    topic_string,
};

/// Settings shape a metrics reporter might load from its own config.
#[derive(Debug, Deserialize)]
struct ReporterSettings {
    thing_name: String,
    format: ReportFormat,
    #[serde(default)]
    key_style: KeyStyle,
}

#[test]
fn e2e_settings_drive_topics() {
    let settings: ReporterSettings = serde_json::from_value(json!({
        "thing_name": "rpi-001",
        "format": "cbor",
        "key_style": "long"
    }))
    .unwrap();

    let publish = topic_string(
        &settings.thing_name,
        TopicVariant::new(settings.format, ReportResponse::Publish),
    )
    .unwrap();
    assert_eq!(publish, "$aws/things/rpi-001/defender/metrics/cbor");

    let [accepted, rejected] = response_topics(&settings.thing_name, settings.format).unwrap();
    for (topic, response) in [
        (accepted, ReportResponse::Accepted),
        (rejected, ReportResponse::Rejected),
    ] {
        let m = match_topic(topic.as_bytes()).unwrap();
        assert_eq!(m.variant.response(), response);
        assert_eq!(m.variant.format(), ReportFormat::Cbor);
    }

    assert_eq!(ReportKey::Header.name(settings.key_style), "header");
}

#[test]
fn e2e_settings_default_key_style() {
    let settings: ReporterSettings = serde_json::from_value(json!({
        "thing_name": "sbc-042",
        "format": "json"
    }))
    .unwrap();
    assert_eq!(settings.key_style, KeyStyle::DEFAULT);
}

#[test]
fn e2e_settings_reject_unknown_format() {
    let result: Result<ReporterSettings, _> = serde_json::from_value(json!({
        "thing_name": "sbc-042",
        "format": "xml"
    }));
    assert!(result.is_err());
}
