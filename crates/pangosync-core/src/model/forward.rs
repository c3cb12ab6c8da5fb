// ── Forward types ──
//
// A forward is one desired routing rule. HTTP forwards are identified by
// their lower-cased FQDN, port forwards by (protocol, source port).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};

// ── Method / protocol ───────────────────────────────────────────────

/// Scheme used to reach an HTTP forward's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Http,
    Https,
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| serde::de::Error::custom(format!("expected HTTP or HTTPS, got '{raw}'")))
    }
}

/// Transport protocol of a port forward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Wire name used on resources (`"tcp"` / `"udp"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }

    /// Target method name (`"TCP"` / `"UDP"`).
    pub fn method(self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
        }
    }
}

// ── Identity ────────────────────────────────────────────────────────

/// Identity key matching a desired forward to a remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForwardKey {
    /// Lower-cased FQDN of an HTTP forward.
    Domain(String),
    Port(Protocol, u16),
}

impl fmt::Display for ForwardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(d) => f.write_str(d),
            Self::Port(p, port) => write!(f, "{}:{port}", p.method()),
        }
    }
}

impl Serialize for ForwardKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Forwards ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpForward {
    pub subdomain: String,
    pub domain: String,
    pub site_name: String,
    pub target_host: String,
    pub target_port: u16,
    pub target_method: HttpMethod,
}

impl HttpForward {
    /// `subdomain.domain`, or just `domain` when there is no subdomain.
    pub fn fqdn(&self) -> String {
        if self.subdomain.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.subdomain, self.domain)
        }
    }
}

impl fmt::Display for HttpForward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}→ {}://{}:{} ({})",
            self.fqdn(),
            self.target_method.as_ref().to_lowercase(),
            self.target_host,
            self.target_port,
            self.site_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortForward {
    pub protocol: Protocol,
    pub site_name: String,
    pub source_port: u16,
    pub target_host: String,
    pub target_port: u16,
    pub name: Option<String>,
}

impl PortForward {
    /// Explicit name, or `"<PROTO> Port {source_port}"`.
    pub fn resource_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} Port {}", self.protocol.method(), self.source_port))
    }
}

impl fmt::Display for PortForward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "[{name}] ")?;
        }
        write!(
            f,
            "{}→ {}:{} {} ({})",
            self.source_port,
            self.target_host,
            self.target_port,
            self.protocol.method(),
            self.site_name
        )
    }
}

/// A desired forward: closed over the kinds the control plane supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Forward {
    Http(HttpForward),
    Port(PortForward),
}

impl Forward {
    pub fn key(&self) -> ForwardKey {
        match self {
            Self::Http(h) => ForwardKey::Domain(h.fqdn().to_lowercase()),
            Self::Port(p) => ForwardKey::Port(p.protocol, p.source_port),
        }
    }

    pub fn site_name(&self) -> &str {
        match self {
            Self::Http(h) => &h.site_name,
            Self::Port(p) => &p.site_name,
        }
    }

    pub fn target_host(&self) -> &str {
        match self {
            Self::Http(h) => &h.target_host,
            Self::Port(p) => &p.target_host,
        }
    }

    pub fn target_port(&self) -> u16 {
        match self {
            Self::Http(h) => h.target_port,
            Self::Port(p) => p.target_port,
        }
    }

    /// Method written to (and compared against) the target record.
    pub fn target_method(&self) -> &'static str {
        match self {
            Self::Http(h) => match h.target_method {
                HttpMethod::Http => "HTTP",
                HttpMethod::Https => "HTTPS",
            },
            Self::Port(p) => p.protocol.method(),
        }
    }

    /// `"HTTP"`, `"TCP"`, or `"UDP"`, for narration.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Http(_) => "HTTP",
            Self::Port(p) => p.protocol.method(),
        }
    }
}

impl fmt::Display for Forward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(h) => h.fmt(f),
            Self::Port(p) => p.fmt(f),
        }
    }
}
