//! Gateway built from a YAML configuration file

use crate::mock_server::WikiServer;
use mediawiki_gateway::{GatewayBuilder, GatewayConfig, RequestParams, WarningPolicy};
use std::io::Write;

#[test]
fn test_yaml_config_reaches_the_wire() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "maxlag: 2\nretry_count: 1\nretry_delay_ms: 0\nwarnings: log\nuser_agent: test-bot/1.0"
    )
    .unwrap();
    let config = GatewayConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.warnings, WarningPolicy::LogAndContinue);
    assert_eq!(config.limit, 500);

    let mut wiki = WikiServer::new();
    let mock = wiki
        .query(&[("maxlag", "2")])
        .match_header("user-agent", "test-bot/1.0")
        .with_status(200)
        .with_body(crate::mock_server::xml(
            r#"<api><warnings><main>Unrecognized parameter: 'bogus'</main></warnings><query/></api>"#,
        ))
        .create();

    let mut gw = GatewayBuilder::new(wiki.api_url())
        .config(config)
        .build()
        .unwrap();
    // logged, not raised
    gw.execute(RequestParams::query().with("bogus", "1"), None)
        .unwrap();
    mock.assert();
}

#[test]
fn test_warnings_raise_by_default() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[("action", "query")],
        r#"<api><warnings><main>Unrecognized parameter: 'bogus'</main></warnings><query/></api>"#,
    );

    let mut gw = wiki.gateway();
    let err = gw
        .execute(RequestParams::query().with("bogus", "1"), None)
        .unwrap_err();
    assert!(err.is_warning());
}

#[test]
fn test_invalid_yaml_is_configuration_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "retry_count: [not a number]").unwrap();
    let err = GatewayConfig::from_yaml_file(file.path()).unwrap_err();
    assert!(matches!(err, mediawiki_gateway::Error::Configuration { .. }));
}
