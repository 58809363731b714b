//! Request engine over real HTTP

use crate::mock_server::{xml, WikiServer, API_PATH};
use mediawiki_gateway::protocol::ProtocolError;
use mediawiki_gateway::{DocPath, Error, RequestParams};
use mockito::Matcher;

#[test]
fn test_query_is_get_with_protocol_params() {
    let mut wiki = WikiServer::new();
    let mock = wiki
        .query_xml(
            &[
                ("action", "query"),
                ("meta", "siteinfo"),
                ("format", "xml"),
                ("maxlag", "5"),
            ],
            r#"<api><query><general sitename="Mock"/></query></api>"#,
        );

    let mut gw = wiki.gateway();
    let response = gw
        .execute(RequestParams::query().with("meta", "siteinfo"), None)
        .unwrap();
    assert_eq!(
        response.document.find("query/general").and_then(|g| g.attr("sitename")),
        Some("Mock")
    );
    mock.assert();
}

#[test]
fn test_mutating_action_is_form_post() {
    let mut wiki = WikiServer::new();
    let mock = wiki
        .server
        .mock("POST", API_PATH)
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(crate::mock_server::encoded(&[
            ("action", "purge"),
            ("titles", "Main Page"),
            ("format", "xml"),
        ]))
        .with_status(200)
        .with_body(xml(r#"<api><purge><page title="Main Page" purged=""/></purge></api>"#))
        .create();

    let mut gw = wiki.gateway();
    gw.execute(
        RequestParams::action("purge").with("titles", "Main Page"),
        None,
    )
    .unwrap();
    mock.assert();
}

#[test]
fn test_503_is_retried_then_succeeds() {
    let mut wiki = WikiServer::new();
    let unavailable = wiki
        .query(&[("action", "query")])
        .with_status(503)
        .with_body("Waiting for a database server")
        .expect(1)
        .create();
    let ok = wiki.query_xml(&[("action", "query")], "<api><query/></api>");

    let mut gw = wiki.gateway();
    gw.execute(RequestParams::query(), None).unwrap();
    unavailable.assert();
    ok.assert();
}

#[test]
fn test_503_until_retry_count_is_bad_status() {
    let mut wiki = WikiServer::new();
    let unavailable = wiki
        .query(&[("action", "query")])
        .with_status(503)
        .with_body("lagged")
        .expect(2)
        .create();

    let mut gw = wiki.builder().retry_count(2).build().unwrap();
    let err = gw.execute(RequestParams::query(), None).unwrap_err();
    match err {
        Error::Protocol(ProtocolError::BadStatus { status, body, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "lagged");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    unavailable.assert();
}

#[test]
fn test_html_body_is_protocol_error() {
    let mut wiki = WikiServer::new();
    let _mock = wiki
        .query(&[("action", "query")])
        .with_status(200)
        .with_body("<!DOCTYPE html><html><body><p>Main Page</body></html>")
        .create();

    let mut gw = wiki.gateway();
    let err = gw.execute(RequestParams::query(), None).unwrap_err();
    assert!(matches!(err, Error::Protocol(_)), "got {err:?}");
}

#[test]
fn test_api_error_element() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[("action", "query")],
        r#"<api servedby="srv1"><error code="maxlag" info="Waiting for 10.0.0.1: 7 seconds lagged"/></api>"#,
    );

    let mut gw = wiki.gateway();
    let err = gw.execute(RequestParams::query(), None).unwrap_err();
    assert_eq!(err.api_code(), Some("maxlag"));
}

#[test]
fn test_cookies_are_echoed() {
    let mut wiki = WikiServer::new();
    let first = wiki
        .server
        .mock("GET", API_PATH)
        .match_query(crate::mock_server::encoded(&[("meta", "userinfo")]))
        .with_status(200)
        .with_header("set-cookie", "wiki_session=s3cr3t; path=/; HttpOnly")
        .with_body(xml(r#"<api><query><userinfo id="0" name="127.0.0.1" anon=""/></query></api>"#))
        .create();
    let second = wiki
        .server
        .mock("GET", API_PATH)
        .match_query(crate::mock_server::encoded(&[("meta", "siteinfo")]))
        .match_header("cookie", Matcher::Regex("wiki_session=s3cr3t".into()))
        .with_status(200)
        .with_body(xml("<api><query/></api>"))
        .create();

    let mut gw = wiki.gateway();
    gw.execute(RequestParams::query().with("meta", "userinfo"), None)
        .unwrap();
    assert_eq!(
        gw.cookies().get("wiki_session").map(String::as_str),
        Some("s3cr3t")
    );
    gw.execute(RequestParams::query().with("meta", "siteinfo"), None)
        .unwrap();
    first.assert();
    second.assert();
}

#[test]
fn test_continuation_value_returned() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[("list", "allpages")],
        r#"<api><query-continue><allpages apcontinue="Beta"/></query-continue><query><allpages><p title="Alpha"/></allpages></query></api>"#,
    );

    let path: DocPath = "//query-continue/allpages/@(apfrom|apcontinue)"
        .parse()
        .unwrap();
    let mut gw = wiki.gateway();
    let response = gw
        .execute(RequestParams::query().with("list", "allpages"), Some(&path))
        .unwrap();
    assert_eq!(response.continuation.as_deref(), Some("Beta"));
}
