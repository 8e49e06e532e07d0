//! Server management over a canonical config and the files that hold one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::Translator;
use crate::error::{Error, Result};
use crate::fs::{read_or_empty, write_atomic};
use crate::model::{Config, Server};
use crate::parser;

/// Insert `server` under its own name.
///
/// Fails with [`Error::ServerExists`] when the name is taken and `replace` is
/// false. Returns the server that was replaced, if any.
pub fn add_server(config: &mut Config, server: Server, replace: bool) -> Result<Option<Server>> {
    if server.name.is_empty() {
        return Err(Error::required("<unnamed>", "name"));
    }
    if !replace && config.servers.contains_key(&server.name) {
        return Err(Error::ServerExists { name: server.name });
    }
    tracing::debug!(server = %server.name, replace, "adding server");
    Ok(config.insert(server))
}

/// Remove and return the server called `name`.
pub fn remove_server(config: &mut Config, name: &str) -> Result<Server> {
    config
        .servers
        .remove(name)
        .ok_or_else(|| Error::ServerNotFound {
            name: name.to_string(),
        })
}

/// Set the `disabled` flag. Returns whether the flag changed.
pub fn set_disabled(config: &mut Config, name: &str, disabled: bool) -> Result<bool> {
    let server = config.get_mut(name).ok_or_else(|| Error::ServerNotFound {
        name: name.to_string(),
    })?;
    let changed = server.disabled != disabled;
    server.disabled = disabled;
    Ok(changed)
}

/// A file on disk holding a config in some format.
pub trait ConfigFile {
    fn path(&self) -> &Path;

    /// Read the file. A missing file is an empty config.
    fn load(&self) -> Result<Config>;

    /// Atomically replace the file with `config`.
    fn save(&self, config: &Config) -> Result<()>;

    /// Load, apply `mutate`, and save only if `mutate` succeeds.
    fn update<T, F>(&self, mutate: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Config) -> Result<T>,
    {
        let mut config = self.load()?;
        let value = mutate(&mut config)?;
        self.save(&config)?;
        Ok(value)
    }
}

/// A client's own config file, read and written through its translator.
#[derive(Debug, Clone)]
pub struct PlatformFile {
    path: PathBuf,
    translator: Arc<dyn Translator>,
}

impl PlatformFile {
    pub fn new(path: impl Into<PathBuf>, translator: Arc<dyn Translator>) -> Self {
        Self {
            path: path.into(),
            translator,
        }
    }

    /// The translator's default location under `home`.
    pub fn at_default_path(home: &Path, translator: Arc<dyn Translator>) -> Self {
        let path = translator.default_path(home);
        Self::new(path, translator)
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }
}

impl ConfigFile for PlatformFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Config> {
        let bytes = read_or_empty(&self.path)?;
        let config = self.translator.to_canonical(&bytes)?;
        tracing::debug!(
            platform = self.translator.platform(),
            path = %self.path.display(),
            servers = config.servers.len(),
            "loaded platform config"
        );
        Ok(config)
    }

    fn save(&self, config: &Config) -> Result<()> {
        for loss in self.translator.unsupported_fields(config) {
            tracing::warn!("{loss}");
        }
        let bytes = self.translator.from_canonical(config)?;
        write_atomic(&self.path, &bytes)?;
        tracing::debug!(
            platform = self.translator.platform(),
            path = %self.path.display(),
            servers = config.servers.len(),
            "saved platform config"
        );
        Ok(())
    }
}

/// A file in the canonical format.
#[derive(Debug, Clone)]
pub struct CanonicalFile {
    path: PathBuf,
}

impl CanonicalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigFile for CanonicalFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Config> {
        parser::parse_file(&self.path)
    }

    fn save(&self, config: &Config) -> Result<()> {
        parser::write_file(&self.path, config)?;
        tracing::debug!(path = %self.path.display(), "saved canonical config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClaudeCodeTranslator, CodexTranslator};
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn config_with(names: &[&str]) -> Config {
        let mut config = Config::new();
        for name in names {
            config.insert(Server::stdio(*name, "npx", vec![]));
        }
        config
    }

    #[test]
    fn add_refuses_duplicates_unless_replacing() {
        let mut config = config_with(&["fs"]);

        let err = add_server(&mut config, Server::stdio("fs", "uvx", vec![]), false).unwrap_err();
        assert!(matches!(err, Error::ServerExists { name } if name == "fs"));
        assert_eq!(config.servers["fs"].command, "npx");

        let previous = add_server(&mut config, Server::stdio("fs", "uvx", vec![]), true).unwrap();
        assert_eq!(previous.unwrap().command, "npx");
        assert_eq!(config.servers["fs"].command, "uvx");
    }

    #[test]
    fn add_requires_a_name() {
        let mut config = Config::new();
        let err = add_server(&mut config, Server::stdio("", "npx", vec![]), false).unwrap_err();
        assert!(err.is_required_field_missing());
        assert!(config.is_empty());
    }

    #[test]
    fn remove_and_toggle_report_missing_servers() {
        let mut config = config_with(&["fs"]);

        assert!(matches!(
            remove_server(&mut config, "git"),
            Err(Error::ServerNotFound { .. })
        ));
        assert!(matches!(
            set_disabled(&mut config, "git", true),
            Err(Error::ServerNotFound { .. })
        ));

        assert!(set_disabled(&mut config, "fs", true).unwrap());
        assert!(!set_disabled(&mut config, "fs", true).unwrap());
        assert_eq!(remove_server(&mut config, "fs").unwrap().name, "fs");
        assert!(config.is_empty());
    }

    #[test]
    fn platform_file_update_keeps_surrounding_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".claude.json");
        std::fs::write(
            &path,
            serde_json::to_vec(&json!({
                "theme": "dark",
                "mcpServers": {"fs": {"command": "npx"}}
            }))
            .unwrap(),
        )
        .unwrap();

        let file = PlatformFile::new(&path, Arc::new(ClaudeCodeTranslator::new()));
        file.update(|config| add_server(config, Server::sse("linear", "https://x/sse"), false))
            .unwrap();

        let written: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["theme"], json!("dark"));
        assert_eq!(written["mcpServers"]["fs"], json!({"command": "npx"}));
        assert_eq!(written["mcpServers"]["linear"], json!({"url": "https://x/sse"}));
    }

    #[test]
    fn failed_update_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let original = b"[mcp.servers.fs]\ncommand = \"npx\"\n";
        std::fs::write(&path, original).unwrap();

        let file = PlatformFile::new(&path, Arc::new(CodexTranslator::new()));
        let result = file.update(|config| remove_server(config, "missing"));

        assert!(result.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[test]
    fn missing_platform_file_loads_empty_and_is_created_on_save() {
        let temp = TempDir::new().unwrap();
        let file = PlatformFile::at_default_path(temp.path(), Arc::new(CodexTranslator::new()));
        assert!(file.load().unwrap().is_empty());

        file.update(|config| add_server(config, Server::stdio("fs", "npx", vec![]), false))
            .unwrap();
        assert!(temp.path().join(".codex/config.toml").exists());
        assert!(file.load().unwrap().get("fs").is_some());
    }

    #[test]
    fn canonical_file_round_trip() {
        let temp = TempDir::new().unwrap();
        let file = CanonicalFile::new(temp.path().join("mcpconf/servers.json"));

        file.update(|config| {
            add_server(config, Server::stdio("fs", "npx", vec![]), false)?;
            set_disabled(config, "fs", true)
        })
        .unwrap();

        let config = file.load().unwrap();
        assert!(config.servers["fs"].disabled);
    }
}
