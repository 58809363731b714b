//! Token manager over real HTTP

use crate::mock_server::WikiServer;
use mediawiki_gateway::{Error, TokenKind};

#[test]
fn test_edit_token_after_503() {
    let mut wiki = WikiServer::new();
    let unavailable = wiki
        .query(&[("prop", "info"), ("intoken", "edit")])
        .with_status(503)
        .expect(1)
        .create();
    let ok = wiki.query_xml(
        &[("prop", "info"), ("intoken", "edit"), ("titles", "Main Page")],
        r#"<api><query><pages><page pageid="1" ns="0" title="Main Page" edittoken="d41d8cd98f00b204e9800998ecf8427e+\"/></pages></query></api>"#,
    );

    let mut gw = wiki.builder().retry_count(3).build().unwrap();
    let token = gw.token(TokenKind::Edit, "Main Page").unwrap();
    assert_eq!(token, "d41d8cd98f00b204e9800998ecf8427e+\\");
    unavailable.assert();
    ok.assert();
}

#[test]
fn test_token_denied() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[("intoken", "protect")],
        r#"<api><query><pages><page pageid="1" ns="0" title="Main Page"/></pages></query></api>"#,
    );

    let mut gw = wiki.gateway();
    let err = gw.token(TokenKind::Protect, "Main Page").unwrap_err();
    assert!(matches!(err, Error::Unauthorized { .. }));
}

#[test]
fn test_undelete_token_absent() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[("list", "deletedrevs"), ("drprop", "token")],
        r#"<api><query><deletedrevs/></query></api>"#,
    );

    let mut gw = wiki.gateway();
    assert_eq!(gw.undelete_token("Never Deleted").unwrap(), None);
}

#[test]
fn test_options_token_via_tokens_action() {
    let mut wiki = WikiServer::new();
    let mock = wiki.post_xml(
        &[("action", "tokens"), ("type", "options")],
        r#"<api><tokens optionstoken="0123+\"/></api>"#,
    );

    let mut gw = wiki.gateway();
    assert_eq!(gw.options_token().unwrap(), "0123+\\");
    mock.assert();
}
