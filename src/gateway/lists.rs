//! List operations built on the continuation iterator.

use crate::params::RequestParams;
use crate::protocol::DocPath;
use crate::transport::Transport;
use crate::{Error, ErrorContext, Result};
use std::collections::BTreeMap;
use std::fmt;

use super::continuation::{ListItem, ListQuery};
use super::core::Gateway;

/// Which links [`Gateway::backlinks`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BacklinkFilter {
    #[default]
    All,
    /// Only redirects to the target.
    Redirects,
    /// Only plain links.
    NonRedirects,
}

impl BacklinkFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            BacklinkFilter::All => "all",
            BacklinkFilter::Redirects => "redirects",
            BacklinkFilter::NonRedirects => "nonredirects",
        }
    }
}

impl fmt::Display for BacklinkFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: Transport> Gateway<T> {
    /// Titles starting with `key`. A `Namespace:prefix` key searches that
    /// namespace.
    ///
    /// A prefix the wiki does not know as a namespace is matched literally in
    /// the main namespace, colon included, so `Star Wars: Episode` finds
    /// `Star Wars: Episode IV`. Sending only the text after the colon instead
    /// would list main-namespace pages starting with ` Episode`.
    pub fn list(&mut self, key: &str) -> Result<Vec<String>> {
        let (namespace, prefix) = match key.split_once(':') {
            Some((ns, rest)) => match self.namespaces_by_prefix()?.get(ns) {
                Some(id) => (*id, rest.to_string()),
                None => (0, key.to_string()),
            },
            None => (0, key.to_string()),
        };

        let query = ListQuery::new("allpages", "//p", "apfrom")?
            .attribute("title")
            .with("apprefix", prefix)
            .with("apnamespace", namespace)
            .with("aplimit", self.config.limit);
        self.collect_list(query)
    }

    pub fn category_members(&mut self, category: &str) -> Result<Vec<String>> {
        let query = ListQuery::new("categorymembers", "//cm", "cmcontinue")?
            .attribute("title")
            .with("cmtitle", category)
            .with("cmlimit", self.config.limit);
        self.collect_list(query)
    }

    /// Titles of pages linking to `title`.
    pub fn backlinks(&mut self, title: &str, filter: BacklinkFilter) -> Result<Vec<String>> {
        let query = ListQuery::new("backlinks", "//bl", "blcontinue")?
            .attribute("title")
            .with("bltitle", title)
            .with("blfilterredir", filter.as_str())
            .with("bllimit", self.config.limit);
        self.collect_list(query)
    }

    /// User names, narrowed by `options` (e.g. `augroup=sysop`).
    pub fn users(&mut self, options: RequestParams) -> Result<Vec<String>> {
        let query = ListQuery::new("allusers", "//u", "aufrom")?
            .attribute("name")
            .params(options)
            .with("aulimit", self.config.limit);
        self.collect_list(query)
    }

    /// Attributes of each contribution by `user`, newest first. With `count`
    /// set, stops fetching once that many are collected.
    pub fn contributions(
        &mut self,
        user: &str,
        count: Option<usize>,
    ) -> Result<Vec<BTreeMap<String, String>>> {
        let query = ListQuery::new("usercontribs", "//item", "uccontinue")?
            .with("ucuser", user)
            .with("uclimit", self.config.limit);
        let items = self.iterate(query).filter_map(|item| match item {
            Ok(ListItem::Element(e)) => Some(Ok(e.attribute_map())),
            Ok(ListItem::Value(_)) => None,
            Err(e) => Some(Err(e)),
        });
        match count {
            Some(n) => items.take(n).collect(),
            None => items.collect(),
        }
    }

    /// Full-text search. Pages through results by offset until the server
    /// stops or `max_results` (default from config) is reached.
    ///
    /// `namespaces` are canonical namespace names; `""` is the main namespace.
    /// An unknown name fails with [`Error::Validation`] before any search is
    /// sent; it is never passed on as an empty namespace id.
    pub fn search(
        &mut self,
        key: &str,
        namespaces: Option<&[&str]>,
        limit: Option<u32>,
        max_results: Option<u32>,
    ) -> Result<Vec<String>> {
        let limit = limit.unwrap_or(self.config.limit);
        let max_results = max_results.unwrap_or(self.config.max_results);

        let mut params = RequestParams::query()
            .with("list", "search")
            .with("srwhat", "text")
            .with("srsearch", key);
        if let Some(names) = namespaces {
            let known = self.namespaces_by_prefix()?;
            let ids = names
                .iter()
                .map(|name| {
                    known.get(*name).map(|id| id.to_string()).ok_or_else(|| {
                        Error::validation_with_context(
                            format!("unknown namespace '{}'", name),
                            ErrorContext::new()
                                .with_field_path("srnamespace")
                                .with_source("search"),
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            params.insert("srnamespace", ids.join("|"));
        }

        let continue_path = DocPath::absolute()
            .descendant("query-continue")
            .child("search")
            .attribute("sroffset");
        let hits = DocPath::absolute().descendant("p").attribute("title");

        let mut titles = Vec::new();
        let mut offset: u32 = 0;
        loop {
            let page_size = limit.min(max_results.saturating_sub(offset));
            if page_size == 0 {
                break;
            }
            params.insert("sroffset", offset);
            params.insert("srlimit", page_size);

            let response = self.execute(params.clone(), Some(&continue_path))?;
            titles.extend(
                hits.select(response.root())
                    .into_iter()
                    .filter_map(|s| s.value()),
            );

            match response.continuation.and_then(|c| c.parse::<u32>().ok()) {
                Some(next) if next < max_results && next > offset => offset = next,
                _ => break,
            }
        }
        Ok(titles)
    }
}
