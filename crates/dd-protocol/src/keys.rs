//! Metrics report key names.
//!
//! Every field of a Device Defender metrics report has a long name and a
//! short name. The service accepts either; short names keep reports small on
//! constrained links. The `long-keys` feature switches the default style.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DefenderError, DefenderResult};

/// Naming style for report keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStyle {
    Long,
    Short,
}

impl KeyStyle {
    #[cfg(feature = "long-keys")]
    pub const DEFAULT: KeyStyle = KeyStyle::Long;
    #[cfg(not(feature = "long-keys"))]
    pub const DEFAULT: KeyStyle = KeyStyle::Short;
}

impl Default for KeyStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for KeyStyle {
    type Err = DefenderError;

    fn from_str(s: &str) -> DefenderResult<Self> {
        match s {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            _ => Err(DefenderError::BadParameter("unknown key style")),
        }
    }
}

/// A field of the metrics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKey {
    Header,
    Metrics,
    ReportId,
    Version,
    TcpConnections,
    EstablishedConnections,
    Connections,
    RemoteAddr,
    LocalPort,
    LocalInterface,
    Total,
    ListeningTcpPorts,
    Ports,
    Port,
    Interface,
    ListeningUdpPorts,
    NetworkStats,
    BytesIn,
    BytesOut,
    PacketsIn,
    PacketsOut,
}

impl ReportKey {
    pub const ALL: [ReportKey; 21] = [
        Self::Header,
        Self::Metrics,
        Self::ReportId,
        Self::Version,
        Self::TcpConnections,
        Self::EstablishedConnections,
        Self::Connections,
        Self::RemoteAddr,
        Self::LocalPort,
        Self::LocalInterface,
        Self::Total,
        Self::ListeningTcpPorts,
        Self::Ports,
        Self::Port,
        Self::Interface,
        Self::ListeningUdpPorts,
        Self::NetworkStats,
        Self::BytesIn,
        Self::BytesOut,
        Self::PacketsIn,
        Self::PacketsOut,
    ];

    /// `(long, short)` names.
    const fn names(self) -> (&'static str, &'static str) {
        match self {
            Self::Header => ("header", "hed"),
            Self::Metrics => ("metrics", "met"),
            Self::ReportId => ("report_id", "rid"),
            Self::Version => ("version", "v"),
            Self::TcpConnections => ("tcp_connections", "tc"),
            Self::EstablishedConnections => ("established_connections", "ec"),
            Self::Connections => ("connections", "cs"),
            Self::RemoteAddr => ("remote_addr", "rad"),
            Self::LocalPort => ("local_port", "lp"),
            Self::LocalInterface => ("local_interface", "li"),
            Self::Total => ("total", "t"),
            Self::ListeningTcpPorts => ("listening_tcp_ports", "tp"),
            Self::Ports => ("ports", "pts"),
            Self::Port => ("port", "pt"),
            Self::Interface => ("interface", "if"),
            Self::ListeningUdpPorts => ("listening_udp_ports", "up"),
            Self::NetworkStats => ("network_stats", "ns"),
            Self::BytesIn => ("bytes_in", "bi"),
            Self::BytesOut => ("bytes_out", "bo"),
            Self::PacketsIn => ("packets_in", "pi"),
            Self::PacketsOut => ("packets_out", "po"),
        }
    }

    pub const fn long_name(self) -> &'static str {
        self.names().0
    }

    pub const fn short_name(self) -> &'static str {
        self.names().1
    }

    pub const fn name(self, style: KeyStyle) -> &'static str {
        match style {
            KeyStyle::Long => self.long_name(),
            KeyStyle::Short => self.short_name(),
        }
    }

    /// Name in the compile-time default style.
    pub const fn key(self) -> &'static str {
        self.name(KeyStyle::DEFAULT)
    }

    /// Find the key whose `style` name is `name`.
    pub fn lookup(name: &str, style: KeyStyle) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name(style) == name)
    }
}
