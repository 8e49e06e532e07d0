//! Claude Desktop translator.
//!
//! Format (`claude_desktop_config.json`):
//! `{ "mcpServers": { "<name>": { "command", "args", "env" } } }`
//!
//! Claude Desktop only launches local servers. Remote servers are skipped on
//! write with a warning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{Translator, decode_servers, document, encode_servers, entry_base_without_marker};
use crate::error::{Error, Result};
use crate::model::{Config, Server, raw};
use crate::parser::to_pretty_json;

const SERVERS_PATH: &[&str] = &["mcpServers"];
const ENTRY_KEYS: &[&str] = &["command", "args", "env"];
const LOSSY_FIELDS: &[&str] = &["url", "transport", "headers", "platforms", "disabled"];

#[derive(Debug, Default)]
pub struct ClaudeDesktopTranslator;

impl ClaudeDesktopTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl Translator for ClaudeDesktopTranslator {
    fn platform(&self) -> &'static str {
        "claude-desktop"
    }

    fn to_canonical(&self, bytes: &[u8]) -> Result<Config> {
        let root = document::json_root(bytes)?;
        decode_servers(root, SERVERS_PATH, |name, map| {
            Entry::from_map(map)?.into_server(name)
        })
    }

    fn from_canonical(&self, config: &Config) -> Result<Vec<u8>> {
        let root = encode_servers(config, SERVERS_PATH, |server| {
            if !server.is_local() {
                tracing::warn!(
                    server = %server.name,
                    "claude-desktop only supports local servers; skipping"
                );
                return Ok(None);
            }
            Entry::from_server(server).map(|entry| Some(entry.into_map()))
        })?;
        to_pretty_json(&Value::Object(root))
    }

    fn lossy_fields(&self) -> &'static [&'static str] {
        LOSSY_FIELDS
    }

    fn default_path(&self, home: &Path) -> PathBuf {
        let base = if cfg!(target_os = "macos") {
            home.join("Library").join("Application Support")
        } else if cfg!(windows) {
            home.join("AppData").join("Roaming")
        } else {
            home.join(".config")
        };
        base.join("Claude").join("claude_desktop_config.json")
    }
}

#[derive(Debug, Default)]
struct Entry {
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    extra: Map<String, Value>,
}

impl Entry {
    fn from_map(mut map: Map<String, Value>) -> Result<Self> {
        Ok(Self {
            command: raw::take_string(&mut map, "command")?.unwrap_or_default(),
            args: raw::take_string_vec(&mut map, "args")?,
            env: raw::take_string_map(&mut map, "env")?,
            extra: map,
        })
    }

    fn into_map(self) -> Map<String, Value> {
        let mut map = self.extra;
        raw::put_string(&mut map, "command", &self.command);
        raw::put_string_vec(&mut map, "args", &self.args);
        raw::put_string_map(&mut map, "env", &self.env);
        map
    }

    fn into_server(self, name: &str) -> Result<Server> {
        if self.command.is_empty() {
            return Err(Error::required(name, "command"));
        }
        Ok(Server {
            name: name.to_string(),
            command: self.command,
            args: self.args,
            env: self.env,
            extra: self.extra,
            ..Server::default()
        })
    }

    fn from_server(server: &Server) -> Result<Self> {
        if server.command.is_empty() {
            return Err(Error::required(&server.name, "command"));
        }
        Ok(Self {
            command: server.command.clone(),
            args: server.args.clone(),
            env: server.env.clone(),
            extra: entry_base_without_marker(server, ENTRY_KEYS),
        })
    }
}
