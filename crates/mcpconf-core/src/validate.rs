//! Semantic validation of a canonical [`Config`].
//!
//! Validation never fails fast: every rule runs over every server and the
//! caller gets the full list of issues in one pass.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{Config, SUPPORTED_PLATFORMS, Server, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A single finding. `server` is `None` for config-level issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub server: Option<String>,
    pub field: Option<String>,
    pub message: String,
}

impl Issue {
    fn error(server: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            server: Some(server.to_string()),
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    fn warning(server: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            server: Some(server.to_string()),
            field: Some(field.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        match (&self.server, &self.field) {
            (Some(server), Some(field)) => write!(f, " [{server}.{field}]")?,
            (Some(server), None) => write!(f, " [{server}]")?,
            (None, Some(field)) => write!(f, " [{field}]")?,
            (None, None) => {}
        }
        write!(f, ": {}", self.message)
    }
}

/// Outcome of validating a config. No issues means the config is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    issues: Vec<Issue>,
}

impl Report {
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Stateless rule checker. The only knob is whether an empty server set is
/// acceptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    allow_empty: bool,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    pub fn validate(&self, config: &Config) -> Report {
        let mut issues = Vec::new();

        if config.servers.is_empty() && !self.allow_empty {
            issues.push(Issue {
                severity: Severity::Error,
                server: None,
                field: Some("servers".to_string()),
                message: "no servers configured".to_string(),
            });
        }

        for (key, server) in &config.servers {
            check_server(key, server, &mut issues);
        }

        Report { issues }
    }
}

fn check_server(key: &str, server: &Server, issues: &mut Vec<Issue>) {
    if server.name.is_empty() {
        issues.push(Issue::error(key, "name", "name is required"));
    } else if server.name != key {
        issues.push(Issue::error(
            key,
            "name",
            format!("name '{}' does not match its key '{key}'", server.name),
        ));
    }

    let has_command = !server.command.is_empty();
    let has_url = !server.url.is_empty();

    let transport_ok = server.transport.is_empty() || Transport::parse(&server.transport).is_some();
    if !transport_ok {
        issues.push(Issue::error(
            key,
            "transport",
            format!(
                "invalid transport '{}' (expected '{}' or '{}')",
                server.transport,
                Transport::STDIO,
                Transport::SSE
            ),
        ));
    }

    if transport_ok {
        match Transport::parse(&server.transport) {
            Some(Transport::Stdio) if !has_command => {
                issues.push(Issue::error(key, "command", "stdio transport requires a command"));
            }
            Some(Transport::Sse) if !has_url => {
                issues.push(Issue::error(key, "url", "sse transport requires a url"));
            }
            None if !has_command && !has_url => {
                issues.push(Issue::error(
                    key,
                    "command/url",
                    "either command or url is required",
                ));
            }
            _ => {}
        }
    }

    if has_command && has_url {
        // An unreadable transport resolves like an absent one: command wins.
        let (used, ignored) = match server.effective_transport() {
            Some(Transport::Sse) => ("url", "command"),
            _ => ("command", "url"),
        };
        issues.push(Issue::warning(
            key,
            "command/url",
            format!("both command and url are set; {used} will be used and {ignored} ignored"),
        ));
    }

    for platform in &server.platforms {
        if !SUPPORTED_PLATFORMS.contains(&platform.as_str()) {
            issues.push(Issue::error(
                key,
                "platforms",
                format!(
                    "unknown platform '{platform}' (expected one of: {})",
                    SUPPORTED_PLATFORMS.join(", ")
                ),
            ));
        }
    }

    check_keys(key, "env", &server.env, issues);
    check_keys(key, "headers", &server.headers, issues);
}

fn check_keys(
    server: &str,
    field: &str,
    map: &BTreeMap<String, String>,
    issues: &mut Vec<Issue>,
) {
    if map.keys().any(|k| k.is_empty()) {
        issues.push(Issue::error(server, field, format!("{field} contains an empty key")));
    }
}
