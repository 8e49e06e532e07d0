use std::sync::Arc;

use mcpconf_core::client::CodexTranslator;
use mcpconf_core::manage::{ConfigFile, PlatformFile, set_disabled};
use tempfile::TempDir;

const CONFIG: &str = r#"model = "o3"

[mcp.servers.git]
command = "uvx"
args = ["mcp-server-git"]

[profiles.fast]
model = "o4-mini"
"#;

fn codex_file(temp: &TempDir) -> PlatformFile {
    let path = temp.path().join("config.toml");
    std::fs::write(&path, CONFIG).unwrap();
    PlatformFile::new(path, Arc::new(CodexTranslator::new()))
}

#[test]
fn disabling_writes_enabled_false() {
    let temp = TempDir::new().unwrap();
    let file = codex_file(&temp);

    file.update(|config| set_disabled(config, "git", true)).unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    assert!(text.contains("enabled = false"));
    assert!(file.load().unwrap().servers["git"].disabled);
}

#[test]
fn enabling_again_removes_the_flag() {
    let temp = TempDir::new().unwrap();
    let file = codex_file(&temp);

    file.update(|config| set_disabled(config, "git", true)).unwrap();
    file.update(|config| set_disabled(config, "git", false)).unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    assert!(!text.contains("enabled"));
    assert!(!file.load().unwrap().servers["git"].disabled);
}

#[test]
fn other_tables_survive_a_rewrite() {
    let temp = TempDir::new().unwrap();
    let file = codex_file(&temp);

    file.update(|config| set_disabled(config, "git", true)).unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    let value: toml::Table = toml::from_str(&text).unwrap();
    assert_eq!(value["model"].as_str(), Some("o3"));
    assert_eq!(value["profiles"]["fast"]["model"].as_str(), Some("o4-mini"));
}

#[test]
fn unknown_datetime_fields_survive_a_rewrite() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        "[mcp.servers.git]\ncommand = \"uvx\"\nadded = 2025-01-02T03:04:05Z\n",
    )
    .unwrap();
    let file = PlatformFile::new(path, Arc::new(CodexTranslator::new()));

    file.update(|config| set_disabled(config, "git", true)).unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    let value: toml::Table = toml::from_str(&text).unwrap();
    let added = &value["mcp"]["servers"]["git"]["added"];
    assert_eq!(
        added.as_datetime().map(ToString::to_string).as_deref(),
        Some("2025-01-02T03:04:05Z")
    );
}
