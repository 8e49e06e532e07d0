use mcpconf_core::model::{Config, Server};
use mcpconf_core::parser;
use mcpconf_core::validate::{Severity, Validator};

#[test]
fn command_and_url_without_transport_is_a_warning_not_an_error() {
    let config = parser::parse(
        br#"{"servers": {"both": {"command": "node", "args": ["srv.js"], "url": "http://localhost:3000"}}}"#,
    )
    .unwrap();

    let report = Validator::new().validate(&config);

    assert!(!report.has_errors());
    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].server.as_deref(), Some("both"));
    assert!(config.servers["both"].is_local());
}

#[test]
fn every_problem_is_reported_in_one_pass() {
    let mut config = Config::new();
    let mut bad_transport = Server::stdio("a", "npx", vec![]);
    bad_transport.transport = "websocket".to_string();
    config.insert(bad_transport);
    config.insert(Server::new("b"));
    let mut bad_platform = Server::stdio("c", "npx", vec![]);
    bad_platform.platforms = vec!["beos".to_string()];
    config.insert(bad_platform);

    let report = Validator::new().validate(&config);

    let servers: Vec<_> = report
        .errors()
        .filter_map(|issue| issue.server.as_deref())
        .collect();
    assert!(servers.contains(&"a"));
    assert!(servers.contains(&"b"));
    assert!(servers.contains(&"c"));
    assert!(report.issues().iter().all(|i| i.severity == Severity::Error));
}

#[test]
fn empty_config_depends_on_allow_empty() {
    let config = Config::new();
    assert!(Validator::new().validate(&config).has_errors());
    assert!(Validator::new().allow_empty(true).validate(&config).is_valid());
}
