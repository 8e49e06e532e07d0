//! Translator layer between the canonical model and each client's own file.
//!
//! Provides:
//! - The [`Translator`] contract every platform implements
//! - One translator per supported client, each owning a private mirror of that
//!   client's on-disk entry shape
//! - A [`TranslatorRegistry`] mapping platform ids to translators

pub mod claude_code;
pub mod claude_desktop;
pub mod codex;
pub(crate) mod document;
pub mod opencode;
pub mod registry;
pub mod vscode;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::raw::expect_object;
use crate::model::{Config, Server, Transport};

pub use claude_code::ClaudeCodeTranslator;
pub use claude_desktop::ClaudeDesktopTranslator;
pub use codex::CodexTranslator;
pub use opencode::OpenCodeTranslator;
pub use registry::TranslatorRegistry;
pub use vscode::VsCodeTranslator;

/// A canonical field that a translator had to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLoss {
    pub platform: &'static str,
    pub server: String,
    pub field: &'static str,
}

impl fmt::Display for FieldLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cannot represent '{}' on server '{}'; it will be dropped",
            self.platform, self.field, self.server
        )
    }
}

impl From<FieldLoss> for Error {
    fn from(loss: FieldLoss) -> Self {
        Error::FieldNotSupported {
            platform: loss.platform.to_string(),
            server: loss.server,
            field: loss.field.to_string(),
        }
    }
}

/// Bidirectional mapping between the canonical config and one client's file.
///
/// `from_canonical` drops fields listed in `lossy_fields` without failing;
/// callers that want to warn first use `unsupported_fields`, callers that
/// want to refuse use `ensure_supported`.
pub trait Translator: Send + Sync + fmt::Debug {
    /// Stable platform identifier (e.g. `"claude-code"`).
    fn platform(&self) -> &'static str;

    /// Decode the client's file contents. Empty input is an empty config.
    fn to_canonical(&self, bytes: &[u8]) -> Result<Config>;

    /// Encode a canonical config as the client's file contents.
    fn from_canonical(&self, config: &Config) -> Result<Vec<u8>>;

    /// Canonical fields this client's format has no place for.
    fn lossy_fields(&self) -> &'static [&'static str];

    /// Where the client keeps its user-level config, relative to `home`.
    fn default_path(&self, home: &Path) -> PathBuf;

    /// Every populated field in `config` that `from_canonical` would drop.
    fn unsupported_fields(&self, config: &Config) -> Vec<FieldLoss> {
        let mut losses = Vec::new();
        for (name, server) in &config.servers {
            for &field in self.lossy_fields() {
                if field_is_set(server, field) {
                    losses.push(FieldLoss {
                        platform: self.platform(),
                        server: name.clone(),
                        field,
                    });
                }
            }
        }
        losses
    }

    /// Fail with [`Error::FieldNotSupported`] on the first lossy field.
    fn ensure_supported(&self, config: &Config) -> Result<()> {
        match self.unsupported_fields(config).into_iter().next() {
            Some(loss) => Err(loss.into()),
            None => Ok(()),
        }
    }
}

fn field_is_set(server: &Server, field: &str) -> bool {
    match field {
        "command" => !server.command.is_empty(),
        "args" => !server.args.is_empty(),
        "url" => !server.url.is_empty(),
        "transport" => !server.transport.is_empty(),
        "env" => !server.env.is_empty(),
        "headers" => !server.headers.is_empty(),
        "platforms" => !server.platforms.is_empty(),
        "disabled" => server.disabled,
        _ => false,
    }
}

/// Platform entries must point somewhere; a bare entry is not guessed at.
pub(crate) fn require_endpoint(name: &str, command: &str, url: &str) -> Result<()> {
    if command.is_empty() && url.is_empty() {
        return Err(Error::required(name, "command/url"));
    }
    Ok(())
}

/// Canonical transport for a marker read from a format that always writes
/// one. A marker that only restates what inference would conclude is
/// dropped, so it does not turn an implicit transport into an explicit one.
pub(crate) fn normalize_marker(marker: Transport, has_command: bool, has_url: bool) -> String {
    if Transport::infer(None, has_command, has_url) == Some(marker) {
        String::new()
    } else {
        marker.as_str().to_string()
    }
}

/// Unknown-bag key that remembers a marker spelled differently from its
/// canonical transport name.
pub(crate) const MARKER_KEY: &str = "type";

/// Marker spellings shared by the formats with a `type` key that are not
/// canonical transport names. Both mean the remote transport.
const MARKER_SYNONYMS: &[&str] = &["http", "streamable-http"];

/// Transport named by a `type` marker.
pub(crate) fn parse_marker(name: &str, marker: &str) -> Result<Transport> {
    match marker {
        "stdio" => Ok(Transport::Stdio),
        "sse" => Ok(Transport::Sse),
        other if MARKER_SYNONYMS.contains(&other) => Ok(Transport::Sse),
        other => Err(Error::invalid_field(
            format!("{name}.type"),
            format!("unknown transport type '{other}'"),
        )),
    }
}

/// Keep a synonym marker in the server's unknown bag so a rewrite can
/// spell it the way the file did.
pub(crate) fn remember_marker(extra: &mut Map<String, Value>, marker: &str) {
    if MARKER_SYNONYMS.contains(&marker) {
        extra.insert(MARKER_KEY.to_string(), Value::String(marker.to_string()));
    }
}

/// The remembered synonym marker, if it still names `transport`.
pub(crate) fn remembered_marker(server: &Server, transport: Transport) -> Option<&str> {
    server
        .extra
        .get(MARKER_KEY)
        .and_then(Value::as_str)
        .filter(|marker| MARKER_SYNONYMS.contains(marker) && transport == Transport::Sse)
}

/// Marker to write for `transport`.
pub(crate) fn marker_spelling(server: &Server, transport: Transport) -> String {
    remembered_marker(server, transport)
        .unwrap_or(transport.as_str())
        .to_string()
}

/// [`entry_base`] for formats with no transport marker; a remembered
/// synonym marker is not carried into them.
pub(crate) fn entry_base_without_marker(server: &Server, known: &[&str]) -> Map<String, Value> {
    let mut base = entry_base(server, known);
    let remembered = base
        .get(MARKER_KEY)
        .and_then(Value::as_str)
        .is_some_and(|marker| MARKER_SYNONYMS.contains(&marker));
    if remembered {
        base.remove(MARKER_KEY);
    }
    base
}

/// Canonical transport of a server that is about to be written, rejecting
/// values outside the canonical vocabulary.
pub(crate) fn explicit_transport(server: &Server) -> Result<Option<Transport>> {
    if server.transport.is_empty() {
        return Ok(None);
    }
    Transport::parse(&server.transport)
        .map(Some)
        .ok_or_else(|| {
            Error::invalid_field(
                format!("{}.transport", server.name),
                format!("unknown transport '{}'", server.transport),
            )
        })
}

/// Lift the servers table at `path` out of `root` and decode each entry.
/// Everything else in `root` becomes the config's unknown bag.
pub(crate) fn decode_servers<F>(
    mut root: Map<String, Value>,
    path: &[&str],
    mut decode: F,
) -> Result<Config>
where
    F: FnMut(&str, Map<String, Value>) -> Result<Server>,
{
    let entries = document::take_map_at_path(&mut root, path)?;
    let mut servers = BTreeMap::new();
    for (name, value) in entries {
        let object = expect_object(value, &format!("{}.{name}", path.join(".")))?;
        let mut server = decode(&name, object)?;
        server.name = name.clone();
        servers.insert(name, server);
    }
    Ok(Config {
        servers,
        extra: root,
    })
}

/// Encode every server and place the table at `path` inside the config's
/// unknown bag. `encode` returns `None` for servers the format cannot hold.
pub(crate) fn encode_servers<F>(
    config: &Config,
    path: &[&str],
    mut encode: F,
) -> Result<Map<String, Value>>
where
    F: FnMut(&Server) -> Result<Option<Map<String, Value>>>,
{
    let mut root = config.extra.clone();
    let mut entries = Map::new();
    for (name, server) in &config.servers {
        if let Some(entry) = encode(server)? {
            entries.insert(name.clone(), Value::Object(entry));
        }
    }
    document::set_map_at_path(&mut root, path, entries)?;
    Ok(root)
}

/// Start a platform entry from the server's unknown bag with the platform's
/// own keys cleared, so typed fields always win.
pub(crate) fn entry_base(server: &Server, known: &[&str]) -> Map<String, Value> {
    let mut map = server.extra.clone();
    for key in known {
        map.remove(*key);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed;

    impl Translator for Fixed {
        fn platform(&self) -> &'static str {
            "fixed"
        }
        fn to_canonical(&self, _bytes: &[u8]) -> Result<Config> {
            Ok(Config::new())
        }
        fn from_canonical(&self, _config: &Config) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        fn lossy_fields(&self) -> &'static [&'static str] {
            &["platforms", "disabled"]
        }
        fn default_path(&self, home: &Path) -> PathBuf {
            home.join("fixed.json")
        }
    }

    #[test]
    fn unsupported_fields_only_reports_populated_fields() {
        let mut config = Config::new();
        let mut server = Server::stdio("a", "npx", vec![]);
        server.platforms = vec!["darwin".to_string()];
        config.insert(server);
        config.insert(Server::stdio("b", "npx", vec![]));

        let losses = Fixed.unsupported_fields(&config);
        assert_eq!(
            losses,
            vec![FieldLoss {
                platform: "fixed",
                server: "a".to_string(),
                field: "platforms",
            }]
        );
    }

    #[test]
    fn ensure_supported_returns_sentinel() {
        let mut config = Config::new();
        let mut server = Server::stdio("a", "npx", vec![]);
        server.disabled = true;
        config.insert(server);

        let err = Fixed.ensure_supported(&config).unwrap_err();
        assert!(err.is_field_not_supported());
    }

    #[test]
    fn redundant_marker_is_normalized_away() {
        assert_eq!(normalize_marker(Transport::Stdio, true, false), "");
        assert_eq!(normalize_marker(Transport::Sse, false, true), "");
        assert_eq!(normalize_marker(Transport::Sse, true, true), "sse");
        assert_eq!(normalize_marker(Transport::Stdio, false, true), "stdio");
    }

    #[test]
    fn remembered_marker_is_written_while_it_still_applies() {
        let mut server = Server::sse("gh", "https://api.githubcopilot.com/mcp/");
        remember_marker(&mut server.extra, "http");
        assert_eq!(marker_spelling(&server, Transport::Sse), "http");
        assert_eq!(marker_spelling(&server, Transport::Stdio), "stdio");

        let mut plain = Server::sse("sse", "http://localhost:3000/sse");
        remember_marker(&mut plain.extra, "sse");
        assert!(plain.extra.is_empty());
        assert_eq!(marker_spelling(&plain, Transport::Sse), "sse");
    }

    #[test]
    fn formats_without_markers_drop_only_remembered_synonyms() {
        let mut server = Server::sse("gh", "https://api.githubcopilot.com/mcp/");
        remember_marker(&mut server.extra, "streamable-http");
        assert!(entry_base_without_marker(&server, &["url"]).is_empty());

        server
            .extra
            .insert(MARKER_KEY.to_string(), Value::String("custom".to_string()));
        assert_eq!(
            entry_base_without_marker(&server, &["url"])[MARKER_KEY],
            Value::String("custom".to_string())
        );
    }

    #[test]
    fn synonym_markers_parse_as_sse() {
        assert_eq!(parse_marker("a", "http").unwrap(), Transport::Sse);
        assert_eq!(parse_marker("a", "streamable-http").unwrap(), Transport::Sse);
        assert!(parse_marker("a", "ws").is_err());
    }

    #[test]
    fn require_endpoint_reports_missing_fields() {
        let err = require_endpoint("bare", "", "").unwrap_err();
        assert!(err.is_required_field_missing());
        assert!(require_endpoint("ok", "npx", "").is_ok());
    }
}
