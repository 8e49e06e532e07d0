//! OpenCode translator.
//!
//! Format (`opencode.json`):
//! ```json
//! { "mcp": {
//!     "fs":     { "type": "local",  "command": ["npx", "-y", "pkg"], "environment": {} },
//!     "linear": { "type": "remote", "url": "https://...", "headers": {}, "enabled": false }
//! } }
//! ```
//!
//! `command` is the full argv. `type` is always written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{
    Translator, decode_servers, document, encode_servers, entry_base, explicit_transport,
    normalize_marker, require_endpoint,
};
use crate::error::{Error, Result};
use crate::model::{Config, Server, Transport, raw};
use crate::parser::to_pretty_json;

const SERVERS_PATH: &[&str] = &["mcp"];
const ENTRY_KEYS: &[&str] = &["type", "command", "url", "environment", "headers", "enabled"];
const LOSSY_FIELDS: &[&str] = &["platforms"];

const LOCAL: &str = "local";
const REMOTE: &str = "remote";

#[derive(Debug, Default)]
pub struct OpenCodeTranslator;

impl OpenCodeTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl Translator for OpenCodeTranslator {
    fn platform(&self) -> &'static str {
        "opencode"
    }

    fn to_canonical(&self, bytes: &[u8]) -> Result<Config> {
        let root = document::json_root(bytes)?;
        decode_servers(root, SERVERS_PATH, |name, map| {
            Entry::from_map(map)?.into_server(name)
        })
    }

    fn from_canonical(&self, config: &Config) -> Result<Vec<u8>> {
        let root = encode_servers(config, SERVERS_PATH, |server| {
            Entry::from_server(server).map(|entry| Some(entry.into_map()))
        })?;
        to_pretty_json(&Value::Object(root))
    }

    fn lossy_fields(&self) -> &'static [&'static str] {
        LOSSY_FIELDS
    }

    fn default_path(&self, home: &Path) -> PathBuf {
        home.join(".config").join("opencode").join("opencode.json")
    }
}

#[derive(Debug, Default)]
struct Entry {
    kind: Option<String>,
    argv: Vec<String>,
    url: String,
    environment: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    enabled: Option<bool>,
    extra: Map<String, Value>,
}

impl Entry {
    fn from_map(mut map: Map<String, Value>) -> Result<Self> {
        Ok(Self {
            kind: raw::take_string(&mut map, "type")?,
            argv: raw::take_string_vec(&mut map, "command")?,
            url: raw::take_string(&mut map, "url")?.unwrap_or_default(),
            environment: raw::take_string_map(&mut map, "environment")?,
            headers: raw::take_string_map(&mut map, "headers")?,
            enabled: raw::take_bool(&mut map, "enabled")?,
            extra: map,
        })
    }

    fn into_map(self) -> Map<String, Value> {
        let mut map = self.extra;
        if let Some(kind) = &self.kind {
            raw::put_string(&mut map, "type", kind);
        }
        raw::put_string_vec(&mut map, "command", &self.argv);
        raw::put_string(&mut map, "url", &self.url);
        raw::put_string_map(&mut map, "environment", &self.environment);
        raw::put_string_map(&mut map, "headers", &self.headers);
        if let Some(enabled) = self.enabled {
            map.insert("enabled".to_string(), Value::Bool(enabled));
        }
        map
    }

    fn into_server(self, name: &str) -> Result<Server> {
        let mut argv = self.argv.into_iter();
        let command = argv.next().unwrap_or_default();
        let args: Vec<String> = argv.collect();
        require_endpoint(name, &command, &self.url)?;

        let transport = match self.kind.as_deref() {
            Some(marker) => {
                normalize_marker(parse_marker(name, marker)?, !command.is_empty(), !self.url.is_empty())
            }
            None => String::new(),
        };
        Ok(Server {
            name: name.to_string(),
            command,
            args,
            url: self.url,
            transport,
            env: self.environment,
            headers: self.headers,
            disabled: self.enabled == Some(false),
            extra: self.extra,
            ..Server::default()
        })
    }

    fn from_server(server: &Server) -> Result<Self> {
        let kind = explicit_transport(server)?
            .or_else(|| server.effective_transport())
            .ok_or_else(|| Error::required(&server.name, "command/url"))?;

        let mut argv = Vec::with_capacity(server.args.len() + 1);
        if !server.command.is_empty() {
            argv.push(server.command.clone());
            argv.extend(server.args.iter().cloned());
        }
        Ok(Self {
            kind: Some(marker_for(kind).to_string()),
            argv,
            url: server.url.clone(),
            environment: server.env.clone(),
            headers: server.headers.clone(),
            enabled: server.disabled.then_some(false),
            extra: entry_base(server, ENTRY_KEYS),
        })
    }
}

fn parse_marker(name: &str, marker: &str) -> Result<Transport> {
    match marker {
        LOCAL => Ok(Transport::Stdio),
        REMOTE => Ok(Transport::Sse),
        other => Err(Error::invalid_field(
            format!("{name}.type"),
            format!("expected '{LOCAL}' or '{REMOTE}', found '{other}'"),
        )),
    }
}

fn marker_for(transport: Transport) -> &'static str {
    match transport {
        Transport::Stdio => LOCAL,
        Transport::Sse => REMOTE,
    }
}
