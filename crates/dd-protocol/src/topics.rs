//! Device Defender MQTT topic builders and parsers.
//!
//! Topic structure:
//! ```text
//! $aws/things/{thing_name}/defender/metrics/json
//! $aws/things/{thing_name}/defender/metrics/json/accepted
//! $aws/things/{thing_name}/defender/metrics/json/rejected
//! $aws/things/{thing_name}/defender/metrics/cbor
//! $aws/things/{thing_name}/defender/metrics/cbor/accepted
//! $aws/things/{thing_name}/defender/metrics/cbor/rejected
//! ```
//!
//! [`build_topic`] and [`match_topic`] work on caller-owned buffers and never
//! allocate. [`topic_string`] and [`response_topics`] are owned conveniences.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DefenderError, DefenderResult};

/// Maximum thing name length, per the AWS IoT Core reference.
pub const THING_NAME_MAX_LENGTH: usize = 128;

/// Minimum period between two metrics reports, per the Device Defender reference.
pub const REPORT_MIN_PERIOD_SECONDS: u64 = 300;

pub const API_PREFIX: &str = "$aws/things/";
pub const API_BRIDGE: &str = "/defender/metrics/";
pub const JSON_REPORT_FORMAT: &str = "json";
pub const CBOR_REPORT_FORMAT: &str = "cbor";
pub const ACCEPTED_SUFFIX: &str = "/accepted";
pub const REJECTED_SUFFIX: &str = "/rejected";

// ─── Topic variants ───

/// Encoding of the metrics report body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Json,
    Cbor,
}

impl ReportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => JSON_REPORT_FORMAT,
            Self::Cbor => CBOR_REPORT_FORMAT,
        }
    }
}

impl FromStr for ReportFormat {
    type Err = DefenderError;

    fn from_str(s: &str) -> DefenderResult<Self> {
        match s {
            JSON_REPORT_FORMAT => Ok(Self::Json),
            CBOR_REPORT_FORMAT => Ok(Self::Cbor),
            _ => Err(DefenderError::BadParameter("unknown report format")),
        }
    }
}

/// Which leg of the report exchange a topic carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportResponse {
    /// Device → service: the report itself.
    Publish,
    /// Service → device: report accepted.
    Accepted,
    /// Service → device: report rejected.
    Rejected,
}

impl ReportResponse {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Publish => "",
            Self::Accepted => ACCEPTED_SUFFIX,
            Self::Rejected => REJECTED_SUFFIX,
        }
    }
}

/// One of the six Device Defender report topics.
///
/// Discriminants follow the wire-level API order used by the C SDK, so
/// `variant as i32` and [`TopicVariant::try_from`] interoperate with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicVariant {
    JsonReportPublish = 0,
    JsonReportAccepted = 1,
    JsonReportRejected = 2,
    CborReportPublish = 3,
    CborReportAccepted = 4,
    CborReportRejected = 5,
}

impl TopicVariant {
    /// All variants, in matching order.
    pub const ALL: [TopicVariant; 6] = [
        Self::JsonReportPublish,
        Self::JsonReportAccepted,
        Self::JsonReportRejected,
        Self::CborReportPublish,
        Self::CborReportAccepted,
        Self::CborReportRejected,
    ];

    pub const fn new(format: ReportFormat, response: ReportResponse) -> Self {
        match (format, response) {
            (ReportFormat::Json, ReportResponse::Publish) => Self::JsonReportPublish,
            (ReportFormat::Json, ReportResponse::Accepted) => Self::JsonReportAccepted,
            (ReportFormat::Json, ReportResponse::Rejected) => Self::JsonReportRejected,
            (ReportFormat::Cbor, ReportResponse::Publish) => Self::CborReportPublish,
            (ReportFormat::Cbor, ReportResponse::Accepted) => Self::CborReportAccepted,
            (ReportFormat::Cbor, ReportResponse::Rejected) => Self::CborReportRejected,
        }
    }

    pub const fn format(self) -> ReportFormat {
        match self {
            Self::JsonReportPublish | Self::JsonReportAccepted | Self::JsonReportRejected => {
                ReportFormat::Json
            }
            Self::CborReportPublish | Self::CborReportAccepted | Self::CborReportRejected => {
                ReportFormat::Cbor
            }
        }
    }

    pub const fn response(self) -> ReportResponse {
        match self {
            Self::JsonReportPublish | Self::CborReportPublish => ReportResponse::Publish,
            Self::JsonReportAccepted | Self::CborReportAccepted => ReportResponse::Accepted,
            Self::JsonReportRejected | Self::CborReportRejected => ReportResponse::Rejected,
        }
    }

    /// The topic tail after the bridge: format followed by suffix.
    pub const fn api(self) -> &'static str {
        match self {
            Self::JsonReportPublish => "json",
            Self::JsonReportAccepted => "json/accepted",
            Self::JsonReportRejected => "json/rejected",
            Self::CborReportPublish => "cbor",
            Self::CborReportAccepted => "cbor/accepted",
            Self::CborReportRejected => "cbor/rejected",
        }
    }
}

impl fmt::Display for TopicVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api())
    }
}

impl FromStr for TopicVariant {
    type Err = DefenderError;

    /// Parses the exact topic tail, e.g. `"cbor/rejected"`.
    fn from_str(s: &str) -> DefenderResult<Self> {
        match_api(s.as_bytes()).ok_or(DefenderError::BadParameter("unknown report api"))
    }
}

impl TryFrom<i32> for TopicVariant {
    type Error = DefenderError;

    fn try_from(value: i32) -> DefenderResult<Self> {
        match value {
            0 => Ok(Self::JsonReportPublish),
            1 => Ok(Self::JsonReportAccepted),
            2 => Ok(Self::JsonReportRejected),
            3 => Ok(Self::CborReportPublish),
            4 => Ok(Self::CborReportAccepted),
            5 => Ok(Self::CborReportRejected),
            _ => {
                tracing::error!(api = value, "invalid defender api value");
                Err(DefenderError::BadParameter("topic variant out of range"))
            }
        }
    }
}

// ─── Topic lengths ───

/// Exact length of the topic for a thing name of `thing_name_len` bytes.
pub const fn topic_length(thing_name_len: usize, variant: TopicVariant) -> usize {
    API_PREFIX.len() + thing_name_len + API_BRIDGE.len() + variant.api().len()
}

/// Length of the longest topic for a thing name of `thing_name_len` bytes.
///
/// A buffer of this size fits every variant.
pub const fn max_topic_length(thing_name_len: usize) -> usize {
    topic_length(thing_name_len, TopicVariant::CborReportAccepted)
}

// ─── Topic building ───

/// Write the topic for `thing_name` and `variant` into `buffer`.
///
/// Returns the number of bytes written. The thing name is copied verbatim.
/// Nothing is written unless the whole topic fits.
pub fn build_topic(
    buffer: &mut [u8],
    thing_name: &[u8],
    variant: TopicVariant,
) -> DefenderResult<usize> {
    check_thing_name_length(thing_name.len())?;

    let required = topic_length(thing_name.len(), variant);
    if buffer.len() < required {
        tracing::error!(
            capacity = buffer.len(),
            required,
            "buffer is too small to hold the topic string"
        );
        return Err(DefenderError::BufferTooSmall {
            required,
            capacity: buffer.len(),
        });
    }

    let mut offset = 0;
    for segment in [
        API_PREFIX.as_bytes(),
        thing_name,
        API_BRIDGE.as_bytes(),
        variant.api().as_bytes(),
    ] {
        buffer[offset..offset + segment.len()].copy_from_slice(segment);
        offset += segment.len();
    }

    Ok(offset)
}

/// Build the topic for `thing_name` and `variant` as an owned string.
pub fn topic_string(thing_name: &str, variant: TopicVariant) -> DefenderResult<String> {
    check_thing_name_length(thing_name.len())?;
    Ok(format!("{API_PREFIX}{thing_name}{API_BRIDGE}{variant}"))
}

/// The accepted and rejected topics a device subscribes to before
/// publishing reports in `format`.
pub fn response_topics(thing_name: &str, format: ReportFormat) -> DefenderResult<[String; 2]> {
    Ok([
        topic_string(thing_name, TopicVariant::new(format, ReportResponse::Accepted))?,
        topic_string(thing_name, TopicVariant::new(format, ReportResponse::Rejected))?,
    ])
}

fn check_thing_name_length(len: usize) -> DefenderResult<()> {
    if len == 0 {
        tracing::error!(thing_name_length = len, "thing name is empty");
        return Err(DefenderError::BadParameter("thing name is empty"));
    }
    if len > THING_NAME_MAX_LENGTH {
        tracing::error!(
            thing_name_length = len,
            max = THING_NAME_MAX_LENGTH,
            "thing name is too long"
        );
        return Err(DefenderError::BadParameter("thing name is too long"));
    }
    Ok(())
}

// ─── Topic matching ───

/// A topic recognised by [`match_topic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicMatch<'a> {
    pub variant: TopicVariant,
    /// Thing name bytes, borrowed from the matched topic.
    pub thing_name: &'a [u8],
    /// Position of the thing name within the topic. Always the prefix length.
    pub thing_name_offset: usize,
}

impl<'a> TopicMatch<'a> {
    pub fn thing_name_len(&self) -> usize {
        self.thing_name.len()
    }

    /// The thing name as text, if it is valid UTF-8.
    pub fn thing_name_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.thing_name).ok()
    }
}

/// Match `topic` against the Device Defender topic grammar.
///
/// Matching is byte-exact and runs prefix → thing name → bridge → api,
/// stopping at the first stage that fails. The thing name is not checked
/// against [`THING_NAME_MAX_LENGTH`].
pub fn match_topic(topic: &[u8]) -> DefenderResult<TopicMatch<'_>> {
    let Some(remaining) = topic.strip_prefix(API_PREFIX.as_bytes()) else {
        tracing::debug!(prefix = API_PREFIX, "topic does not contain the defender prefix");
        return Err(DefenderError::NoMatch);
    };

    let Some(thing_name_len) = thing_name_length(remaining) else {
        tracing::debug!("topic does not contain a valid thing name");
        return Err(DefenderError::NoMatch);
    };
    let (thing_name, remaining) = remaining.split_at(thing_name_len);

    let Some(remaining) = remaining.strip_prefix(API_BRIDGE.as_bytes()) else {
        tracing::debug!(bridge = API_BRIDGE, "topic does not contain the defender bridge");
        return Err(DefenderError::NoMatch);
    };

    let Some(variant) = match_api(remaining) else {
        tracing::debug!("topic does not contain a defender api");
        return Err(DefenderError::NoMatch);
    };

    Ok(TopicMatch {
        variant,
        thing_name,
        thing_name_offset: API_PREFIX.len(),
    })
}

/// Length of the leading segment terminated by `/`. Empty or unterminated
/// segments are not thing names.
fn thing_name_length(remaining: &[u8]) -> Option<usize> {
    match remaining.iter().position(|&b| b == b'/') {
        Some(0) | None => None,
        Some(len) => Some(len),
    }
}

fn match_api(remaining: &[u8]) -> Option<TopicVariant> {
    TopicVariant::ALL
        .into_iter()
        .find(|variant| variant.api().as_bytes() == remaining)
}
