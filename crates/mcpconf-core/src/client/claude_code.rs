//! Claude Code translator.
//!
//! Format (`~/.claude.json`):
//! `{ "mcpServers": { "<name>": { "type", "command", "args", "url", "env", "headers" } } }`
//!
//! `type` is optional. `"http"` and `"streamable-http"` are read as the
//! canonical `sse` transport; the spelling is remembered in the server's
//! unknown bag and written back unchanged while the transport stays remote.
//! Claude Code has no per-OS restriction and no disable switch, so
//! `platforms` and `disabled` are dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{
    Translator, decode_servers, document, encode_servers, entry_base, explicit_transport,
    marker_spelling, parse_marker, remember_marker, remembered_marker, require_endpoint,
};
use crate::error::Result;
use crate::model::{Config, Server, raw};
use crate::parser::to_pretty_json;

const SERVERS_PATH: &[&str] = &["mcpServers"];
const ENTRY_KEYS: &[&str] = &["type", "command", "args", "url", "env", "headers"];
const LOSSY_FIELDS: &[&str] = &["platforms", "disabled"];

#[derive(Debug, Default)]
pub struct ClaudeCodeTranslator;

impl ClaudeCodeTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl Translator for ClaudeCodeTranslator {
    fn platform(&self) -> &'static str {
        "claude-code"
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
        home.join(".claude.json")
    }
}

/// One entry under `mcpServers`.
#[derive(Debug, Default)]
struct Entry {
    kind: Option<String>,
    command: String,
    args: Vec<String>,
    url: String,
    env: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    extra: Map<String, Value>,
}

impl Entry {
    fn from_map(mut map: Map<String, Value>) -> Result<Self> {
        Ok(Self {
            kind: raw::take_string(&mut map, "type")?,
            command: raw::take_string(&mut map, "command")?.unwrap_or_default(),
            args: raw::take_string_vec(&mut map, "args")?,
            url: raw::take_string(&mut map, "url")?.unwrap_or_default(),
            env: raw::take_string_map(&mut map, "env")?,
            headers: raw::take_string_map(&mut map, "headers")?,
            extra: map,
        })
    }

    fn into_map(self) -> Map<String, Value> {
        let mut map = self.extra;
        if let Some(kind) = &self.kind {
            raw::put_string(&mut map, "type", kind);
        }
        raw::put_string(&mut map, "command", &self.command);
        raw::put_string_vec(&mut map, "args", &self.args);
        raw::put_string(&mut map, "url", &self.url);
        raw::put_string_map(&mut map, "env", &self.env);
        raw::put_string_map(&mut map, "headers", &self.headers);
        map
    }

    fn into_server(self, name: &str) -> Result<Server> {
        require_endpoint(name, &self.command, &self.url)?;
        let mut extra = self.extra;
        let transport = match self.kind.as_deref() {
            Some(marker) => {
                let transport = parse_marker(name, marker)?;
                remember_marker(&mut extra, marker);
                transport.as_str().to_string()
            }
            None => String::new(),
        };
        Ok(Server {
            name: name.to_string(),
            command: self.command,
            args: self.args,
            url: self.url,
            transport,
            env: self.env,
            headers: self.headers,
            extra,
            ..Server::default()
        })
    }

    fn from_server(server: &Server) -> Result<Self> {
        require_endpoint(&server.name, &server.command, &server.url)?;
        let kind = match explicit_transport(server)? {
            Some(transport) => Some(marker_spelling(server, transport)),
            None => server
                .effective_transport()
                .and_then(|transport| remembered_marker(server, transport))
                .map(str::to_string),
        };
        Ok(Self {
            kind,
            command: server.command.clone(),
            args: server.args.clone(),
            url: server.url.clone(),
            env: server.env.clone(),
            headers: server.headers.clone(),
            extra: entry_base(server, ENTRY_KEYS),
        })
    }
}
