//! VS Code translator.
//!
//! Format (user `mcp.json`):
//! `{ "servers": { "<name>": { "type", "command", "args", "env", "url", "headers" } }, "inputs": [...] }`
//!
//! VS Code always writes `type`. `"http"` and `"streamable-http"` are read as
//! `sse`; the spelling is remembered in the server's unknown bag and written
//! back unchanged while the transport stays remote.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{
    Translator, decode_servers, document, encode_servers, entry_base, explicit_transport,
    marker_spelling, normalize_marker, parse_marker, remember_marker, require_endpoint,
};
use crate::error::{Error, Result};
use crate::model::{Config, Server, raw};
use crate::parser::to_pretty_json;

const SERVERS_PATH: &[&str] = &["servers"];
const ENTRY_KEYS: &[&str] = &["type", "command", "args", "env", "url", "headers"];
const LOSSY_FIELDS: &[&str] = &["platforms", "disabled"];

#[derive(Debug, Default)]
pub struct VsCodeTranslator;

impl VsCodeTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl Translator for VsCodeTranslator {
    fn platform(&self) -> &'static str {
        "vscode"
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
        let base = if cfg!(target_os = "macos") {
            home.join("Library").join("Application Support")
        } else if cfg!(windows) {
            home.join("AppData").join("Roaming")
        } else {
            home.join(".config")
        };
        base.join("Code").join("User").join("mcp.json")
    }
}

#[derive(Debug, Default)]
struct Entry {
    kind: Option<String>,
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    url: String,
    headers: BTreeMap<String, String>,
    extra: Map<String, Value>,
}

impl Entry {
    fn from_map(mut map: Map<String, Value>) -> Result<Self> {
        Ok(Self {
            kind: raw::take_string(&mut map, "type")?,
            command: raw::take_string(&mut map, "command")?.unwrap_or_default(),
            args: raw::take_string_vec(&mut map, "args")?,
            env: raw::take_string_map(&mut map, "env")?,
            url: raw::take_string(&mut map, "url")?.unwrap_or_default(),
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
        raw::put_string_map(&mut map, "env", &self.env);
        raw::put_string(&mut map, "url", &self.url);
        raw::put_string_map(&mut map, "headers", &self.headers);
        map
    }

    fn into_server(self, name: &str) -> Result<Server> {
        require_endpoint(name, &self.command, &self.url)?;
        let mut extra = self.extra;
        let transport = match self.kind.as_deref() {
            Some(marker) => {
                let parsed = parse_marker(name, marker)?;
                remember_marker(&mut extra, marker);
                normalize_marker(parsed, !self.command.is_empty(), !self.url.is_empty())
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
        let kind = explicit_transport(server)?
            .or_else(|| server.effective_transport())
            .ok_or_else(|| Error::required(&server.name, "command/url"))?;
        Ok(Self {
            kind: Some(marker_spelling(server, kind)),
            command: server.command.clone(),
            args: server.args.clone(),
            env: server.env.clone(),
            url: server.url.clone(),
            headers: server.headers.clone(),
            extra: entry_base(server, ENTRY_KEYS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Config {
        VsCodeTranslator
            .to_canonical(&serde_json::to_vec(&value).unwrap())
            .unwrap()
    }

    fn encode(config: &Config) -> Value {
        serde_json::from_slice(&VsCodeTranslator.from_canonical(config).unwrap()).unwrap()
    }

    #[test]
    fn type_is_always_written() {
        let mut config = Config::new();
        config.insert(Server::stdio("fs", "npx", vec!["pkg".to_string()]));
        config.insert(Server::sse("gh", "https://api.githubcopilot.com/mcp/"));

        assert_eq!(
            encode(&config),
            json!({
                "servers": {
                    "fs": {"type": "stdio", "command": "npx", "args": ["pkg"]},
                    "gh": {"type": "sse", "url": "https://api.githubcopilot.com/mcp/"}
                }
            })
        );
    }

    #[test]
    fn redundant_type_reads_back_as_inferred() {
        let config = decode(json!({
            "servers": {
                "fs": {"type": "stdio", "command": "npx"},
                "gh": {"type": "http", "url": "https://api.githubcopilot.com/mcp/"},
                "mixed": {"type": "sse", "command": "node", "url": "http://localhost:3000"}
            }
        }));

        assert_eq!(config.servers["fs"].transport, "");
        assert_eq!(config.servers["gh"].transport, "");
        assert!(config.servers["gh"].is_remote());
        assert_eq!(config.servers["mixed"].transport, "sse");
    }

    #[test]
    fn http_type_is_written_back_as_http() {
        let input = json!({
            "servers": {
                "github": {"type": "http", "url": "https://api.githubcopilot.com/mcp/"},
                "stream": {"type": "streamable-http", "url": "https://example.com/mcp"}
            }
        });
        let config = decode(input.clone());
        assert_eq!(config.servers["github"].transport, "");
        assert_eq!(encode(&config), input);
    }

    #[test]
    fn round_trip_keeps_inputs_and_explicit_transport() {
        let input = json!({
            "inputs": [{"type": "promptString", "id": "token", "password": true}],
            "servers": {
                "mixed": {"type": "sse", "command": "node", "url": "http://localhost:3000"},
                "fs": {"type": "stdio", "command": "npx", "envFile": "${workspaceFolder}/.env"}
            }
        });
        let config = decode(input.clone());
        assert_eq!(encode(&config), input);

        let again = VsCodeTranslator
            .to_canonical(&VsCodeTranslator.from_canonical(&config).unwrap())
            .unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn invalid_canonical_transport_is_rejected_on_write() {
        let mut server = Server::stdio("fs", "npx", vec![]);
        server.transport = "websocket".to_string();
        let mut config = Config::new();
        config.insert(server);

        let err = VsCodeTranslator.from_canonical(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));
    }

    #[test]
    fn server_without_endpoint_cannot_be_written() {
        let mut config = Config::new();
        config.insert(Server::new("bare"));
        let err = VsCodeTranslator.from_canonical(&config).unwrap_err();
        assert!(err.is_required_field_missing());
    }

    #[test]
    fn platforms_are_reported_and_dropped() {
        let mut server = Server::stdio("fs", "npx", vec![]);
        server.platforms = vec!["darwin".to_string()];
        let mut config = Config::new();
        config.insert(server);

        assert_eq!(VsCodeTranslator.unsupported_fields(&config).len(), 1);
        let back = VsCodeTranslator
            .to_canonical(&VsCodeTranslator.from_canonical(&config).unwrap())
            .unwrap();
        assert!(back.servers["fs"].platforms.is_empty());
    }
}
