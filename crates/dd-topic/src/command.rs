//! Command parsing and execution.

use std::ffi::OsString;

use anyhow::Context;

use dd_protocol::error::DefenderError;
use dd_protocol::keys::{KeyStyle, ReportKey};
use dd_protocol::topics::{self, ReportFormat, THING_NAME_MAX_LENGTH, TopicVariant};

use crate::error::CliError;

pub const USAGE: &str = "\
usage:
  dd-topic build <thing-name> <api>
  dd-topic match <topic>      (<topic> may hold any bytes)
  dd-topic keys [long|short]
  dd-topic subscriptions <thing-name> <json|cbor>

<api> is one of: json, json/accepted, json/rejected, cbor, cbor/accepted, cbor/rejected";

/// Large enough for any topic the builder accepts.
const TOPIC_BUFFER_LEN: usize = topics::max_topic_length(THING_NAME_MAX_LENGTH);

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Build {
        thing_name: String,
        variant: TopicVariant,
    },
    Match {
        /// Raw topic bytes; the thing name need not be UTF-8.
        topic: Vec<u8>,
    },
    Keys {
        style: KeyStyle,
    },
    Subscriptions {
        thing_name: String,
        format: ReportFormat,
    },
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Text(String),
    /// `match` was given a topic outside the Device Defender grammar.
    NoMatch,
}

impl Command {
    /// Parse arguments, excluding the program name.
    ///
    /// Takes OS strings so `match` can receive topics that are not UTF-8.
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into);
        let name = text(args.next().ok_or(CliError::MissingCommand)?, "command")?;

        let command = match name.as_str() {
            "build" => {
                let thing_name = text(required(&mut args, "thing-name")?, "thing-name")?;
                let api = required(&mut args, "api")?;
                Command::Build {
                    thing_name,
                    variant: parse_value(api, "api")?,
                }
            }
            "match" => Command::Match {
                topic: required(&mut args, "topic")?.into_encoded_bytes(),
            },
            "keys" => {
                let style = match args.next() {
                    Some(style) => parse_value(style, "style")?,
                    None => KeyStyle::DEFAULT,
                };
                Command::Keys { style }
            }
            "subscriptions" => {
                let thing_name = text(required(&mut args, "thing-name")?, "thing-name")?;
                let format = required(&mut args, "format")?;
                Command::Subscriptions {
                    thing_name,
                    format: parse_value(format, "format")?,
                }
            }
            _ => return Err(CliError::UnknownCommand(name)),
        };

        match args.next() {
            Some(extra) => Err(CliError::UnexpectedArgument(
                extra.to_string_lossy().into_owned(),
            )),
            None => Ok(command),
        }
    }

    pub fn run(&self) -> anyhow::Result<Output> {
        match self {
            Command::Build {
                thing_name,
                variant,
            } => {
                let mut buffer = [0u8; TOPIC_BUFFER_LEN];
                let len = topics::build_topic(&mut buffer, thing_name.as_bytes(), *variant)
                    .with_context(|| format!("failed to build {variant} topic"))?;
                let topic = std::str::from_utf8(&buffer[..len])?;
                tracing::debug!(%variant, len, "topic built");
                Ok(Output::Text(topic.to_string()))
            }
            Command::Match { topic } => match topics::match_topic(topic) {
                Ok(m) => {
                    tracing::debug!(variant = %m.variant, "topic matched");
                    let thing_name = String::from_utf8_lossy(m.thing_name);
                    Ok(Output::Text(format!(
                        "api: {}\nformat: {}\nthing_name: {}\noffset: {}\nlength: {}",
                        m.variant,
                        m.variant.format().as_str(),
                        thing_name,
                        m.thing_name_offset,
                        m.thing_name_len(),
                    )))
                }
                Err(DefenderError::NoMatch) => Ok(Output::NoMatch),
                Err(e) => Err(e.into()),
            },
            Command::Keys { style } => {
                let lines: Vec<String> = ReportKey::ALL
                    .iter()
                    .map(|key| format!("{:<24} {}", key.long_name(), key.name(*style)))
                    .collect();
                Ok(Output::Text(lines.join("\n")))
            }
            Command::Subscriptions { thing_name, format } => {
                let [accepted, rejected] = topics::response_topics(thing_name, *format)
                    .context("failed to build response topics")?;
                Ok(Output::Text(format!("{accepted}\n{rejected}")))
            }
        }
    }
}

fn required(
    args: &mut impl Iterator<Item = OsString>,
    name: &'static str,
) -> Result<OsString, CliError> {
    args.next().ok_or(CliError::MissingArgument(name))
}

fn text(value: OsString, name: &'static str) -> Result<String, CliError> {
    value
        .into_string()
        .map_err(|value| CliError::InvalidArgument {
            name,
            value: value.to_string_lossy().into_owned(),
        })
}

fn parse_value<T: std::str::FromStr>(value: OsString, name: &'static str) -> Result<T, CliError> {
    let value = text(value, name)?;
    value
        .parse()
        .map_err(|_| CliError::InvalidArgument { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_build() {
        let cmd = Command::parse(args(&["build", "rpi-001", "cbor/accepted"])).unwrap();
        assert_eq!(
            cmd,
            Command::Build {
                thing_name: "rpi-001".into(),
                variant: TopicVariant::CborReportAccepted,
            }
        );
    }

    #[test]
    fn parse_keys_default_style() {
        let cmd = Command::parse(args(&["keys"])).unwrap();
        assert_eq!(
            cmd,
            Command::Keys {
                style: KeyStyle::DEFAULT
            }
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Command::parse(args(&[])), Err(CliError::MissingCommand));
        assert_eq!(
            Command::parse(args(&["publish"])),
            Err(CliError::UnknownCommand("publish".into()))
        );
        assert_eq!(
            Command::parse(args(&["build", "rpi-001"])),
            Err(CliError::MissingArgument("api"))
        );
        assert_eq!(
            Command::parse(args(&["build", "rpi-001", "xml"])),
            Err(CliError::InvalidArgument {
                name: "api",
                value: "xml".into()
            })
        );
        assert_eq!(
            Command::parse(args(&["match", "a", "b"])),
            Err(CliError::UnexpectedArgument("b".into()))
        );
        assert!(matches!(
            Command::parse(args(&["subscriptions", "rpi-001", "yaml"])),
            Err(CliError::InvalidArgument { name: "format", .. })
        ));
    }

    #[test]
    fn run_build() {
        let cmd = Command::parse(args(&["build", "MyThing", "json"])).unwrap();
        assert_eq!(
            cmd.run().unwrap(),
            Output::Text("$aws/things/MyThing/defender/metrics/json".into())
        );
    }

    #[test]
    fn run_build_rejects_long_thing_name() {
        let cmd = Command::Build {
            thing_name: "x".repeat(THING_NAME_MAX_LENGTH + 1),
            variant: TopicVariant::JsonReportPublish,
        };
        let err = cmd.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DefenderError>(),
            Some(DefenderError::BadParameter(_))
        ));
    }

    #[test]
    fn run_match() {
        let cmd = Command::Match {
            topic: "$aws/things/MyThing/defender/metrics/cbor/rejected".into(),
        };
        let Output::Text(text) = cmd.run().unwrap() else {
            panic!("expected a match");
        };
        assert!(text.contains("api: cbor/rejected"));
        assert!(text.contains("thing_name: MyThing"));
        assert!(text.contains("offset: 12"));
        assert!(text.contains("length: 7"));
    }

    #[cfg(unix)]
    #[test]
    fn run_match_non_utf8_topic() {
        use std::os::unix::ffi::OsStringExt;

        let mut topic = b"$aws/things/".to_vec();
        topic.extend_from_slice(&[0xFF, 0xFE, b'x']);
        topic.extend_from_slice(b"/defender/metrics/json");
        let cmd = Command::parse([OsString::from("match"), OsString::from_vec(topic)]).unwrap();

        let Output::Text(text) = cmd.run().unwrap() else {
            panic!("expected a match");
        };
        assert!(text.contains("api: json"));
        assert!(text.contains("length: 3"));
    }

    #[cfg(unix)]
    #[test]
    fn parse_rejects_non_utf8_thing_name_for_build() {
        use std::os::unix::ffi::OsStringExt;

        let result = Command::parse([
            OsString::from("build"),
            OsString::from_vec(vec![0xFF, b'a']),
            OsString::from("json"),
        ]);
        assert!(matches!(
            result,
            Err(CliError::InvalidArgument {
                name: "thing-name",
                ..
            })
        ));
    }

    #[test]
    fn run_match_no_match() {
        let cmd = Command::Match {
            topic: "$aws/things/MyThing".into(),
        };
        assert_eq!(cmd.run().unwrap(), Output::NoMatch);
    }

    #[test]
    fn run_keys_long() {
        let cmd = Command::Keys {
            style: KeyStyle::Long,
        };
        let Output::Text(text) = cmd.run().unwrap() else {
            panic!("expected key table");
        };
        assert_eq!(text.lines().count(), ReportKey::ALL.len());
        assert!(text.lines().next().unwrap().ends_with(" header"));
    }

    #[test]
    fn run_subscriptions() {
        let cmd = Command::parse(args(&["subscriptions", "rpi-001", "json"])).unwrap();
        assert_eq!(
            cmd.run().unwrap(),
            Output::Text(
                "$aws/things/rpi-001/defender/metrics/json/accepted\n\
                 $aws/things/rpi-001/defender/metrics/json/rejected"
                    .into()
            )
        );
    }
}
