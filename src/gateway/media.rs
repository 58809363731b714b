//! Image and interlanguage-link lookups that follow redirects, and file download.

use crate::params::RequestParams;
use crate::protocol::{DocPath, Element, ProtocolError};
use crate::transport::{HttpRequest, Method, Transport};
use crate::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::debug;

use super::core::Gateway;

const DEFAULT_IMAGE_LIMIT: u32 = 200;
const DEFAULT_LANGLINK_LIMIT: u32 = 500;

/// A page addressed by title or by page id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Title(String),
    Id(u64),
}

impl PageRef {
    fn apply(&self, params: RequestParams, title_prefix: &str) -> RequestParams {
        match self {
            PageRef::Title(title) => params.with("titles", format!("{}{}", title_prefix, title)),
            PageRef::Id(id) => params.with("pageids", id.to_string()),
        }
    }
}

impl From<&str> for PageRef {
    fn from(title: &str) -> Self {
        PageRef::Title(title.to_string())
    }
}

impl From<String> for PageRef {
    fn from(title: String) -> Self {
        PageRef::Title(title)
    }
}

impl From<u64> for PageRef {
    fn from(id: u64) -> Self {
        PageRef::Id(id)
    }
}

impl<T: Transport> Gateway<T> {
    /// Titles of the images used on a page. `None` when the page does not exist.
    pub fn images(
        &mut self,
        page: impl Into<PageRef>,
        limit: Option<u32>,
    ) -> Result<Option<Vec<String>>> {
        let params = RequestParams::query()
            .with("prop", "images")
            .with("imlimit", limit.unwrap_or(DEFAULT_IMAGE_LIMIT));
        let Some(page) = self.resolved_page(params, &page.into(), "")? else {
            return Ok(None);
        };
        let titles = DocPath::relative()
            .child("images")
            .child("im")
            .attribute("title");
        Ok(Some(
            titles
                .select(&page)
                .into_iter()
                .filter_map(|s| s.value())
                .collect(),
        ))
    }

    /// Interlanguage links of a page, language code to title.
    pub fn langlinks(
        &mut self,
        page: impl Into<PageRef>,
        limit: Option<u32>,
    ) -> Result<Option<BTreeMap<String, String>>> {
        let params = RequestParams::query()
            .with("prop", "langlinks")
            .with("lllimit", limit.unwrap_or(DEFAULT_LANGLINK_LIMIT));
        let Some(page) = self.resolved_page(params, &page.into(), "")? else {
            return Ok(None);
        };
        let links = DocPath::relative().child("langlinks").child("ll");
        Ok(Some(
            links
                .select(&page)
                .into_iter()
                .filter_map(|s| s.as_element())
                .filter_map(|ll| Some((ll.attr("lang")?.to_string(), ll.text().unwrap_or_default())))
                .collect(),
        ))
    }

    /// Title of the page in language `lang`, if the wiki links one.
    pub fn langlink_for_lang(
        &mut self,
        page: impl Into<PageRef>,
        lang: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .langlinks(page, None)?
            .and_then(|mut links| links.remove(lang)))
    }

    /// Attributes of the latest `imageinfo` entry for a file.
    ///
    /// A title is given without its `File:` prefix. `props` selects `iiprop`
    /// values such as `timestamp` or `url`; empty leaves the server default.
    pub fn image_info(
        &mut self,
        file: impl Into<PageRef>,
        props: &[&str],
    ) -> Result<Option<BTreeMap<String, String>>> {
        let params = RequestParams::query()
            .with("prop", "imageinfo")
            .with_opt("iiprop", (!props.is_empty()).then(|| props.join("|")));
        let Some(page) = self.resolved_page(params, &file.into(), "File:")? else {
            return Ok(None);
        };
        Ok(page.find("imageinfo/ii").map(Element::attribute_map))
    }

    /// Contents of a file, fetched from the URL its image info reports.
    ///
    /// Session cookies are only sent when the file lives on the wiki's own host.
    pub fn download(&mut self, file: impl Into<PageRef>) -> Result<Option<Bytes>> {
        let Some(url) = self
            .image_info(file, &["url"])?
            .and_then(|mut info| info.remove("url"))
        else {
            return Ok(None);
        };
        let url = self.session.base_url().join(&url).map_err(|_| {
            Error::from(ProtocolError::missing(
                "imageinfo",
                format!("imageinfo/ii/@url ('{}')", url),
            ))
        })?;

        let same_host = url.host_str() == self.session.base_url().host_str();
        let params = RequestParams::new();
        let request = HttpRequest {
            method: Method::Get,
            url: &url,
            params: &params,
            cookie_header: if same_host {
                self.session.cookie_header()
            } else {
                None
            },
        };
        debug!(url = %url, same_host, "downloading file");
        let response = self.transport.send(&request)?;
        if !(200..300).contains(&response.status) {
            return Err(ProtocolError::BadStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
                hint: None,
            }
            .with_hint(format!("downloading {}", url))
            .into());
        }
        Ok(Some(response.body))
    }

    /// Run a single-page `prop` query with `redirects`. When the server
    /// reports a resolved redirect the query is repeated once by page id.
    /// `None` for missing pages, and for invalid ones the warning policy lets
    /// through.
    fn resolved_page(
        &mut self,
        params: RequestParams,
        page: &PageRef,
        title_prefix: &str,
    ) -> Result<Option<Element>> {
        let params = params.with_flag("redirects", true);
        let response = self.execute(page.apply(params.clone(), title_prefix), None)?;
        let found = response.root().find("query/pages/page");
        if !self.valid_page(found)? {
            return Ok(None);
        }
        if response.root().find("query/redirects/r").is_none() {
            return Ok(found.cloned());
        }

        let pageid = found
            .and_then(|p| p.attr("pageid"))
            .and_then(|id| id.parse::<u64>().ok())
            .ok_or_else(|| ProtocolError::missing("query", "query/pages/page/@pageid"))?;
        debug!(pageid, "following redirect");
        let response = self.execute(PageRef::Id(pageid).apply(params, title_prefix), None)?;
        let found = response.root().find("query/pages/page");
        if !self.valid_page(found)? {
            return Ok(None);
        }
        Ok(found.cloned())
    }
}
