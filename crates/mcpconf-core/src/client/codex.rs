//! Codex translator (TOML).
//!
//! Format (`~/.codex/config.toml`):
//! ```toml
//! [mcp.servers.fs]
//! command = "npx"
//! args = ["-y", "pkg"]
//! enabled = false
//!
//! [mcp.servers.fs.env]
//! ROOT = "/tmp"
//! ```
//!
//! `enabled` is the inverse of canonical `disabled` and is only written when
//! the server is disabled. There is no transport marker; it is inferred.
//! Unknown TOML datetimes ride through the canonical model as tagged objects
//! and are written back as datetimes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{
    Translator, decode_servers, document, encode_servers, entry_base_without_marker,
    require_endpoint,
};
use crate::error::Result;
use crate::model::{Config, Server, raw};

const SERVERS_PATH: &[&str] = &["mcp", "servers"];
const ENTRY_KEYS: &[&str] = &["command", "args", "env", "url", "enabled"];
const LOSSY_FIELDS: &[&str] = &["transport", "headers", "platforms"];

#[derive(Debug, Default)]
pub struct CodexTranslator;

impl CodexTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl Translator for CodexTranslator {
    fn platform(&self) -> &'static str {
        "codex"
    }

    fn to_canonical(&self, bytes: &[u8]) -> Result<Config> {
        let root = document::toml_root(bytes)?;
        decode_servers(root, SERVERS_PATH, |name, map| {
            Entry::from_map(map)?.into_server(name)
        })
    }

    fn from_canonical(&self, config: &Config) -> Result<Vec<u8>> {
        let root = encode_servers(config, SERVERS_PATH, |server| {
            Entry::from_server(server).map(|entry| Some(entry.into_map()))
        })?;
        document::toml_bytes(&root)
    }

    fn lossy_fields(&self) -> &'static [&'static str] {
        LOSSY_FIELDS
    }

    fn default_path(&self, home: &Path) -> PathBuf {
        home.join(".codex").join("config.toml")
    }
}

#[derive(Debug, Default)]
struct Entry {
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    url: String,
    enabled: Option<bool>,
    extra: Map<String, Value>,
}

impl Entry {
    fn from_map(mut map: Map<String, Value>) -> Result<Self> {
        Ok(Self {
            command: raw::take_string(&mut map, "command")?.unwrap_or_default(),
            args: raw::take_string_vec(&mut map, "args")?,
            env: raw::take_string_map(&mut map, "env")?,
            url: raw::take_string(&mut map, "url")?.unwrap_or_default(),
            enabled: raw::take_bool(&mut map, "enabled")?,
            extra: map,
        })
    }

    fn into_map(self) -> Map<String, Value> {
        let mut map = self.extra;
        raw::put_string(&mut map, "command", &self.command);
        raw::put_string_vec(&mut map, "args", &self.args);
        raw::put_string_map(&mut map, "env", &self.env);
        raw::put_string(&mut map, "url", &self.url);
        if let Some(enabled) = self.enabled {
            map.insert("enabled".to_string(), Value::Bool(enabled));
        }
        map
    }

    fn into_server(self, name: &str) -> Result<Server> {
        require_endpoint(name, &self.command, &self.url)?;
        Ok(Server {
            name: name.to_string(),
            command: self.command,
            args: self.args,
            url: self.url,
            env: self.env,
            disabled: self.enabled == Some(false),
            extra: self.extra,
            ..Server::default()
        })
    }

    fn from_server(server: &Server) -> Result<Self> {
        require_endpoint(&server.name, &server.command, &server.url)?;
        Ok(Self {
            command: server.command.clone(),
            args: server.args.clone(),
            env: server.env.clone(),
            url: server.url.clone(),
            enabled: server.disabled.then_some(false),
            extra: entry_base_without_marker(server, ENTRY_KEYS),
        })
    }
}
