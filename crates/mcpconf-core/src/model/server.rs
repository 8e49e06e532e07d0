//! Canonical MCP server definition.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::raw;
use crate::error::Result;

/// Operating systems a server can be restricted to.
pub const SUPPORTED_PLATFORMS: [&str; 3] = ["darwin", "linux", "windows"];

/// Keys owned by the typed fields of [`Server`].
const KNOWN_KEYS: [&str; 9] = [
    "name",
    "command",
    "args",
    "url",
    "transport",
    "env",
    "headers",
    "platforms",
    "disabled",
];

/// Resolved communication mode of a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// Local subprocess over standard I/O.
    Stdio,
    /// Remote server over HTTP / server-sent events.
    Sse,
}

impl Transport {
    pub const STDIO: &'static str = "stdio";
    pub const SSE: &'static str = "sse";

    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Stdio => Self::STDIO,
            Transport::Sse => Self::SSE,
        }
    }

    /// Parse an explicit canonical transport value. The empty string is not a
    /// transport; it means "infer".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            Self::STDIO => Some(Transport::Stdio),
            Self::SSE => Some(Transport::Sse),
            _ => None,
        }
    }

    /// Inference shared by the model and every translator: an explicit
    /// marker wins, then a command means local, then a url alone means
    /// remote. A command and a url without a marker resolve to local.
    pub fn infer(explicit: Option<Transport>, has_command: bool, has_url: bool) -> Option<Self> {
        match explicit {
            Some(transport) => Some(transport),
            None if has_command => Some(Transport::Stdio),
            None if has_url => Some(Transport::Sse),
            None => None,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single MCP server in canonical form.
///
/// The model accepts any combination of fields; structural rules (which
/// fields each transport needs, legal transport values) belong to the
/// validator. Keys this schema does not know are kept in `extra` and written
/// back untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Server {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub url: String,
    /// `"stdio"`, `"sse"`, or empty to infer from `command` / `url`.
    pub transport: String,
    pub env: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub platforms: Vec<String>,
    pub disabled: bool,
    pub extra: Map<String, Value>,
}

impl Server {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A local server launched as `command args...`.
    pub fn stdio(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
            ..Self::default()
        }
    }

    /// A remote server reached at `url`.
    pub fn sse(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn is_local(&self) -> bool {
        self.transport == Transport::STDIO
            || (self.transport.is_empty() && !self.command.is_empty())
    }

    pub fn is_remote(&self) -> bool {
        self.transport == Transport::SSE
            || (self.transport.is_empty() && !self.url.is_empty() && self.command.is_empty())
    }

    /// The transport this server resolves to, or `None` when it is neither
    /// local nor remote.
    pub fn effective_transport(&self) -> Option<Transport> {
        if self.transport.is_empty() {
            Transport::infer(None, !self.command.is_empty(), !self.url.is_empty())
        } else {
            Transport::parse(&self.transport)
        }
    }

    /// Decode a server from its raw JSON object.
    pub fn from_map(mut map: Map<String, Value>) -> Result<Self> {
        Ok(Self {
            name: raw::take_string(&mut map, "name")?.unwrap_or_default(),
            command: raw::take_string(&mut map, "command")?.unwrap_or_default(),
            args: raw::take_string_vec(&mut map, "args")?,
            url: raw::take_string(&mut map, "url")?.unwrap_or_default(),
            transport: raw::take_string(&mut map, "transport")?.unwrap_or_default(),
            env: raw::take_string_map(&mut map, "env")?,
            headers: raw::take_string_map(&mut map, "headers")?,
            platforms: raw::take_string_vec(&mut map, "platforms")?,
            disabled: raw::take_bool(&mut map, "disabled")?.unwrap_or(false),
            extra: map,
        })
    }

    /// Encode the server as a raw JSON object: unknown fields first, then
    /// every non-empty known field on top.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        for key in KNOWN_KEYS {
            map.remove(key);
        }
        raw::put_string(&mut map, "name", &self.name);
        raw::put_string(&mut map, "command", &self.command);
        raw::put_string_vec(&mut map, "args", &self.args);
        raw::put_string(&mut map, "url", &self.url);
        raw::put_string(&mut map, "transport", &self.transport);
        raw::put_string_map(&mut map, "env", &self.env);
        raw::put_string_map(&mut map, "headers", &self.headers);
        raw::put_string_vec(&mut map, "platforms", &self.platforms);
        if self.disabled {
            map.insert("disabled".to_string(), Value::Bool(true));
        }
        map
    }
}

impl Serialize for Server {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Server {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::deserialize(deserializer)?;
        Server::from_map(map).map_err(D::Error::custom)
    }
}
