//! Continued list queries over real HTTP

use crate::mock_server::WikiServer;
use mediawiki_gateway::{BacklinkFilter, ListItem, ListQuery};

#[test]
fn test_category_members_follow_cmcontinue() {
    let mut wiki = WikiServer::new();
    // matches the follow-up request too; a satisfied mock yields to one still missing hits
    let first = wiki
        .query(&[
            ("list", "categorymembers"),
            ("cmtitle", "Category:Birds"),
        ])
        .with_status(200)
        .with_body(crate::mock_server::xml(
            r#"<api><query-continue><categorymembers cmcontinue="page|4f5754|42"/></query-continue>
               <query><categorymembers><cm ns="0" title="Crow"/><cm ns="0" title="Owl"/></categorymembers></query></api>"#,
        ))
        .expect(1)
        .create();
    let second = wiki.query_xml(
        &[
            ("list", "categorymembers"),
            ("cmcontinue", "page|4f5754|42"),
        ],
        r#"<api><query><categorymembers><cm ns="0" title="Wren"/></categorymembers></query></api>"#,
    );

    let mut gw = wiki.gateway();
    let titles = gw.category_members("Category:Birds").unwrap();
    assert_eq!(titles, vec!["Crow", "Owl", "Wren"]);
    first.assert();
    second.assert();
}

#[test]
fn test_backlinks_single_page() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[
            ("list", "backlinks"),
            ("bltitle", "Target"),
            ("blfilterredir", "nonredirects"),
            ("bllimit", "500"),
        ],
        r#"<api><query><backlinks><bl pageid="3" ns="0" title="Linker"/></backlinks></query></api>"#,
    );

    let mut gw = wiki.gateway();
    assert_eq!(
        gw.backlinks("Target", BacklinkFilter::NonRedirects).unwrap(),
        vec!["Linker"]
    );
}

#[test]
fn test_raw_element_iteration() {
    let mut wiki = WikiServer::new();
    let _mock = wiki.query_xml(
        &[("list", "recentchanges")],
        r#"<api><query><recentchanges><rc type="edit" title="A" revid="10"/><rc type="new" title="B" revid="11"/></recentchanges></query></api>"#,
    );

    let mut gw = wiki.gateway();
    let query = ListQuery::new("recentchanges", "rc", "rccontinue")
        .unwrap()
        .with("rclimit", 50u32);
    let kinds: Vec<String> = gw
        .iterate(query)
        .map(|item| match item.unwrap() {
            ListItem::Element(e) => e.attr("type").unwrap_or_default().to_string(),
            ListItem::Value(v) => v,
        })
        .collect();
    assert_eq!(kinds, vec!["edit", "new"]);
}
