//! Page operations over real HTTP

use crate::mock_server::{encoded, xml, WikiServer, API_PATH};
use mediawiki_gateway::{EditOptions, UploadOptions, UploadSource};
use mockito::Matcher;
use std::io::Write;

const EDIT_TOKEN: &str = r#"<api><query><pages><page pageid="1" ns="0" title="Sandbox" edittoken="e1+\"/></pages></query></api>"#;

#[test]
fn test_get_page_content() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[("prop", "revisions"), ("rvprop", "content"), ("titles", "Page")],
        r#"<api><query><pages><page pageid="1" ns="0" title="Page"><revisions><rev xml:space="preserve">Hello</rev></revisions></page></pages></query></api>"#,
    );

    let mut gw = wiki.gateway();
    assert_eq!(gw.get("Page").unwrap().as_deref(), Some("Hello"));
}

#[test]
fn test_get_missing_page() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[("titles", "Page")],
        r#"<api><query><pages><page ns="0" title="Page" missing="true"/></pages></query></api>"#,
    );

    let mut gw = wiki.gateway();
    assert_eq!(gw.get("Page").unwrap(), None);
}

#[test]
fn test_edit_posts_fresh_token() {
    let mut wiki = WikiServer::new();
    let token = wiki.query_xml(&[("intoken", "edit"), ("titles", "Sandbox")], EDIT_TOKEN);
    let edit = wiki.post_xml(
        &[
            ("action", "edit"),
            ("title", "Sandbox"),
            ("text", "Hello & goodbye"),
            ("token", "e1+\\"),
            ("summary", "test"),
        ],
        r#"<api><edit result="Success" pageid="1" title="Sandbox" newrevid="2"/></api>"#,
    );

    let mut gw = wiki.gateway();
    let doc = gw
        .edit(
            "Sandbox",
            "Hello & goodbye",
            &EditOptions {
                summary: Some("test".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(
        doc.find("edit").and_then(|e| e.attr("result")),
        Some("Success")
    );
    token.assert();
    edit.assert();
}

#[test]
fn test_upload_file_is_multipart() {
    let mut file = tempfile::Builder::new()
        .prefix("upload")
        .suffix(".txt")
        .tempfile()
        .unwrap();
    file.write_all(b"file contents").unwrap();

    let mut wiki = WikiServer::new();
    let _token = wiki.query_xml(&[("intoken", "edit"), ("titles", "Notes.txt")], EDIT_TOKEN);
    let upload = wiki
        .server
        .mock("POST", API_PATH)
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="action"\r\n\r\nupload"#.into()),
            Matcher::Regex(r#"name="filename"\r\n\r\nNotes.txt"#.into()),
            Matcher::Regex(r#"name="file"; filename="upload"#.into()),
            Matcher::Regex("file contents".into()),
        ]))
        .with_status(200)
        .with_body(xml(
            r#"<api><upload result="Success" filename="Notes.txt"/></api>"#,
        ))
        .create();

    let mut gw = wiki.gateway();
    gw.upload(
        UploadSource::File(file.path().to_path_buf()),
        &UploadOptions {
            filename: Some("Notes.txt".into()),
            ..Default::default()
        },
    )
    .unwrap();
    upload.assert();
}

#[test]
fn test_upload_from_url_is_form_post() {
    let mut wiki = WikiServer::new();
    let _token = wiki.query_xml(&[("intoken", "edit"), ("titles", "Logo.png")], EDIT_TOKEN);
    let upload = wiki
        .server
        .mock("POST", API_PATH)
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(encoded(&[
            ("action", "upload"),
            ("url", "https://example.org/files/Logo.png"),
            ("filename", "Logo.png"),
        ]))
        .with_status(200)
        .with_body(xml(r#"<api><upload result="Success"/></api>"#))
        .create();

    let mut gw = wiki.gateway();
    gw.upload(
        UploadSource::Url("https://example.org/files/Logo.png".into()),
        &UploadOptions::default(),
    )
    .unwrap();
    upload.assert();
}

#[test]
fn test_undelete_nothing_to_restore() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[("list", "deletedrevs")],
        r#"<api><query><deletedrevs/></query></api>"#,
    );
    let undelete = wiki
        .server
        .mock("POST", API_PATH)
        .expect(0)
        .create();

    let mut gw = wiki.gateway();
    assert_eq!(gw.undelete("Never Deleted").unwrap(), 0);
    undelete.assert();
}

#[test]
fn test_langlinks_follow_redirect() {
    let mut wiki = WikiServer::new();
    let by_title = wiki.query_xml(
        &[("prop", "langlinks"), ("titles", "Jerusalem (city)"), ("redirects", "")],
        r#"<api><query><redirects><r from="Jerusalem (city)" to="Jerusalem"/></redirects><pages><page pageid="1234" ns="0" title="Jerusalem"/></pages></query></api>"#,
    );
    let by_id = wiki.query_xml(
        &[("prop", "langlinks"), ("pageids", "1234")],
        r#"<api><query><pages><page pageid="1234" ns="0" title="Jerusalem"><langlinks><ll lang="de">Jerusalem</ll><ll lang="id">Yerusalem</ll></langlinks></page></pages></query></api>"#,
    );

    let mut gw = wiki.gateway();
    assert_eq!(
        gw.langlink_for_lang("Jerusalem (city)", "id").unwrap().as_deref(),
        Some("Yerusalem")
    );
    by_title.assert();
    by_id.assert();
}

#[test]
fn test_download_reads_file_url() {
    let mut wiki = WikiServer::new();
    let file_url = format!("{}/images/a/a1/Cat.jpg", wiki.server.url());
    let _info = wiki.query_xml(
        &[("prop", "imageinfo"), ("titles", "File:Cat.jpg"), ("iiprop", "url")],
        &format!(
            r#"<api><query><pages><page pageid="9" ns="6" title="File:Cat.jpg"><imageinfo><ii url="{}"/></imageinfo></page></pages></query></api>"#,
            file_url
        ),
    );
    let file = wiki
        .server
        .mock("GET", "/images/a/a1/Cat.jpg")
        .with_status(200)
        .with_body(b"\xff\xd8\xffJPEG".as_slice())
        .create();

    let mut gw = wiki.gateway();
    let bytes = gw.download("Cat.jpg").unwrap().unwrap();
    assert_eq!(&bytes[..], b"\xff\xd8\xffJPEG");
    file.assert();
}
