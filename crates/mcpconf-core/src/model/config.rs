//! Canonical configuration: the full set of servers plus unknown top-level keys.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{Server, raw};
use crate::error::Result;

const SERVERS_KEY: &str = "servers";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Servers keyed by name. The key and `Server::name` agree.
    pub servers: BTreeMap<String, Server>,
    pub extra: Map<String, Value>,
}

impl Config {
    /// An empty configuration ("no servers configured").
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Server> {
        self.servers.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Server> {
        self.servers.get_mut(name)
    }

    /// Insert a server under its own name, returning any server it replaced.
    pub fn insert(&mut self, server: Server) -> Option<Server> {
        self.servers.insert(server.name.clone(), server)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    /// Decode a configuration from its raw JSON object. Servers that do not
    /// carry a `name` take the map key.
    pub fn from_map(mut map: Map<String, Value>) -> Result<Self> {
        let mut servers = BTreeMap::new();
        if let Some(entries) = raw::take_object(&mut map, SERVERS_KEY)? {
            for (key, value) in entries {
                let object = raw::expect_object(value, &format!("{SERVERS_KEY}.{key}"))?;
                let mut server = Server::from_map(object)?;
                if server.name.is_empty() {
                    server.name = key.clone();
                }
                servers.insert(key, server);
            }
        }
        Ok(Self {
            servers,
            extra: map,
        })
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        let servers = self
            .servers
            .iter()
            .map(|(name, server)| (name.clone(), Value::Object(server.to_map())))
            .collect();
        map.insert(SERVERS_KEY.to_string(), Value::Object(servers));
        map
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::deserialize(deserializer)?;
        Config::from_map(map).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_config_has_no_servers() {
        let config = Config::new();
        assert!(config.is_empty());
        assert!(config.extra.is_empty());
    }

    #[test]
    fn name_is_populated_from_key() {
        let config: Config = serde_json::from_value(json!({
            "servers": {"github": {"command": "gh-mcp"}}
        }))
        .unwrap();
        assert_eq!(config.servers["github"].name, "github");
    }

    #[test]
    fn explicit_name_is_kept() {
        let config: Config = serde_json::from_value(json!({
            "servers": {"github": {"name": "gh", "command": "gh-mcp"}}
        }))
        .unwrap();
        assert_eq!(config.servers["github"].name, "gh");
    }

    #[test]
    fn top_level_unknown_keys_round_trip() {
        let input = json!({
            "version": 2,
            "servers": {"a": {"name": "a", "url": "https://a"}},
            "$schema": "https://example.com/schema.json"
        });
        let config: Config = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(config.extra.len(), 2);
        assert_eq!(serde_json::to_value(&config).unwrap(), input);
    }

    #[test]
    fn non_object_server_entry_is_rejected() {
        let result = serde_json::from_value::<Config>(json!({"servers": {"a": "npx"}}));
        assert!(result.unwrap_err().to_string().contains("servers.a"));
    }

    #[test]
    fn insert_keys_by_name() {
        let mut config = Config::new();
        assert!(config.insert(Server::stdio("a", "npx", vec![])).is_none());
        assert!(config.insert(Server::sse("a", "https://a")).is_some());
        assert_eq!(config.names().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(config.get("a").unwrap().url, "https://a");
    }
}
