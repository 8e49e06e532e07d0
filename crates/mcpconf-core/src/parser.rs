//! Canonical config parsing and persistence.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::fs::{read_or_empty, write_atomic};
use crate::model::Config;
use crate::model::raw::expect_object;

/// Parse canonical JSON. Empty or whitespace-only input yields an empty
/// config: no servers configured is a valid state.
pub fn parse(bytes: &[u8]) -> Result<Config> {
    Config::from_map(json_object(bytes)?)
}

/// Parse a canonical config file. A missing file is treated as empty input.
pub fn parse_file(path: &Path) -> Result<Config> {
    let bytes = read_or_empty(path)?;
    let config = parse(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        servers = config.servers.len(),
        "loaded canonical config"
    );
    Ok(config)
}

/// Serialize a config as indented JSON with a trailing newline.
pub fn write(config: &Config) -> Result<Vec<u8>> {
    to_pretty_json(&Value::Object(config.to_map()))
}

/// Serialize and atomically replace `path` with the result.
pub fn write_file(path: &Path, config: &Config) -> Result<()> {
    let bytes = write(config)?;
    write_atomic(path, &bytes)
}

/// Decode a JSON document whose root must be an object. Empty or
/// whitespace-only input is an empty object.
pub(crate) fn json_object(bytes: &[u8]) -> Result<Map<String, Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| Error::json_syntax(&e, bytes))?;
    expect_object(value, "<root>")
}

pub(crate) fn to_pretty_json(value: &Value) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Server;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_config() -> Config {
        let mut config = Config::new();
        let mut local = Server::stdio(
            "filesystem",
            "npx",
            vec!["-y".to_string(), "@modelcontextprotocol/server-filesystem".to_string()],
        );
        local.env = BTreeMap::from([("ROOT".to_string(), "/tmp".to_string())]);
        local.platforms = vec!["linux".to_string(), "darwin".to_string()];
        config.insert(local);

        let mut remote = Server::sse("linear", "https://mcp.linear.app/sse");
        remote.transport = "sse".to_string();
        remote.headers = BTreeMap::from([("Authorization".to_string(), "Bearer t".to_string())]);
        remote.disabled = true;
        config.insert(remote);
        config
    }

    #[test]
    fn empty_input_is_an_empty_config() {
        assert_eq!(parse(b"").unwrap(), Config::new());
        assert_eq!(parse(b"  \n").unwrap(), Config::new());
    }

    #[test]
    fn write_then_parse_round_trips() {
        let config = sample_config();
        let bytes = write(&config).unwrap();
        assert_eq!(parse(&bytes).unwrap(), config);
    }

    #[test]
    fn write_is_indented_and_newline_terminated() {
        let bytes = write(&sample_config()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"servers\": {"));
    }

    #[test]
    fn malformed_json_is_a_syntax_error() {
        let err = parse(b"{\"servers\": {\"a\": }}").unwrap_err();
        match err {
            Error::Syntax { format, offset, .. } => {
                assert_eq!(format, "JSON");
                assert_eq!(offset, 18);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = parse(b"[1, 2]").unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));
    }

    #[test]
    fn parse_file_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let config = parse_file(&temp.path().join("absent.json")).unwrap();
        assert!(config.servers.is_empty());
    }

    #[test]
    fn parse_file_zero_length_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.json");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(parse_file(&path).unwrap(), Config::new());
    }

    #[test]
    fn parse_file_read_error_carries_path() {
        let temp = TempDir::new().unwrap();
        // Reading a directory fails with something other than NotFound.
        let err = parse_file(temp.path()).unwrap_err();
        match err {
            Error::Io { path, .. } => assert_eq!(path, temp.path()),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn write_file_then_parse_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sub/servers.json");
        let config = sample_config();

        write_file(&path, &config).unwrap();

        assert_eq!(parse_file(&path).unwrap(), config);
    }
}
