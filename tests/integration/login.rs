//! Login and account creation negotiation

use crate::mock_server::{encoded, xml, WikiServer, API_PATH};
use mediawiki_gateway::{Error, RequestParams};
use mockito::Matcher;

#[test]
fn test_login_needtoken_round_trip() {
    let mut wiki = WikiServer::new();
    let first = wiki
        .post(&[("action", "login"), ("lgname", "Bob"), ("lgpassword", "secret")])
        .with_status(200)
        .with_header("set-cookie", "wiki_session=abc; path=/")
        .with_body(xml(
            r#"<api><login result="NeedToken" token="b5780b6e2f27e20b450921d9461010b4" cookieprefix="wiki" sessionid="abc"/></api>"#,
        ))
        .expect(1)
        .create();
    let second = wiki
        .server
        .mock("POST", API_PATH)
        .match_body(encoded(&[
            ("action", "login"),
            ("lgname", "Bob"),
            ("lgdomain", "local"),
            ("lgtoken", "b5780b6e2f27e20b450921d9461010b4"),
        ]))
        .match_header("cookie", Matcher::Regex("wiki_session=abc".into()))
        .with_status(200)
        .with_header("set-cookie", "wikiUserID=7; path=/")
        .with_body(xml(
            r#"<api><login result="Success" lguserid="7" lgusername="Bob" lgtoken="t" cookieprefix="wiki" sessionid="abc"/></api>"#,
        ))
        .expect(1)
        .create();

    let mut gw = wiki.gateway();
    gw.login("Bob", "secret", None).unwrap();

    first.assert();
    second.assert();
    assert_eq!(gw.session().username(), Some("Bob"));
    assert_eq!(gw.cookies().get("wikiUserID").map(String::as_str), Some("7"));
}

#[test]
fn test_login_wrong_password() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.post_xml(
        &[("action", "login")],
        r#"<api><login result="WrongPass"/></api>"#,
    );

    let mut gw = wiki.gateway();
    match gw.login("Bob", "nope", None).unwrap_err() {
        Error::Unauthorized { message } => assert_eq!(message, "login failed: WrongPass"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(gw.session().credentials().is_none());
}

#[test]
fn test_create_account_needtoken_uses_token() {
    let mut wiki = WikiServer::new();
    let first = wiki
        .post(&[("action", "createaccount"), ("name", "Alice")])
        .with_status(200)
        .with_body(xml(r#"<api><createaccount result="needtoken" token="c0ffee"/></api>"#))
        .expect(1)
        .create();
    let second = wiki
        .post(&[("action", "createaccount"), ("token", "c0ffee")])
        .with_status(200)
        .with_body(xml(
            r#"<api><createaccount result="success" token="c0ffee" userid="12" username="Alice"/></api>"#,
        ))
        .expect(1)
        .create();

    let mut gw = wiki.gateway();
    gw.create_account(
        RequestParams::new()
            .with("name", "Alice")
            .with("password", "correct horse"),
    )
    .unwrap();
    first.assert();
    second.assert();
}

#[test]
fn test_create_account_rejected() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.post_xml(
        &[("action", "createaccount")],
        r#"<api><createaccount result="Failure"/></api>"#,
    );

    let mut gw = wiki.gateway();
    let err = gw
        .create_account(RequestParams::new().with("name", "Alice"))
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized { .. }));
}
