//! Continuation Iterator
//!
//! List queries come back a page at a time. Each page may carry a
//! `query-continue/<list>` element whose `<pp>from` or `<pp>continue`
//! attribute (`pp` being the first two letters of the continuation parameter)
//! is fed back as that parameter on the next request. The server omitting
//! `query-continue` ends the sequence.

use crate::params::{ParamValue, RequestParams};
use crate::protocol::{DocPath, Element, Selected};
use crate::transport::Transport;
use crate::{Error, ErrorContext, Result};
use std::collections::VecDeque;
use tracing::debug;

use super::core::Gateway;

/// A list query ready to be iterated.
#[derive(Debug, Clone)]
pub struct ListQuery {
    list: String,
    result_path: DocPath,
    attribute: Option<String>,
    continue_param: String,
    continue_path: DocPath,
    params: RequestParams,
}

impl ListQuery {
    /// `result_path` selects result elements; relative paths are scoped under
    /// `//query/<list>/`. `continue_param` is the request parameter that
    /// receives the continuation value, e.g. `apfrom` or `cmcontinue`.
    pub fn new(list: &str, result_path: &str, continue_param: &str) -> Result<Self> {
        let parsed: DocPath = result_path.parse().map_err(|e| {
            Error::validation_with_context(
                format!("invalid result path: {}", e),
                ErrorContext::new()
                    .with_field_path("result_path")
                    .with_details(result_path)
                    .with_source("continuation"),
            )
        })?;
        let result_path = parsed.scoped_under(&DocPath::absolute().descendant("query").child(list));

        let prefix: String = continue_param.chars().take(2).collect();
        let continue_path = DocPath::absolute()
            .descendant("query-continue")
            .child(list)
            .attribute_any_of([format!("{}from", prefix), format!("{}continue", prefix)]);

        Ok(Self {
            list: list.to_string(),
            result_path,
            attribute: None,
            continue_param: continue_param.to_string(),
            continue_path,
            params: RequestParams::new(),
        })
    }

    /// Project every result element to this attribute's value. Elements
    /// without the attribute are skipped.
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = Some(name.into());
        self
    }

    /// Extra request parameters. `action` and `list` are always overridden.
    pub fn params(mut self, params: RequestParams) -> Self {
        self.params = self.params.merge(params);
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn list(&self) -> &str {
        &self.list
    }

    pub fn result_path(&self) -> &DocPath {
        &self.result_path
    }

    pub fn continue_path(&self) -> &DocPath {
        &self.continue_path
    }

    fn request(&self) -> RequestParams {
        self.params
            .clone()
            .with("action", "query")
            .with("list", self.list.as_str())
    }
}

/// One result of a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    /// Projected attribute value (or a selected attribute).
    Value(String),
    /// The raw result element.
    Element(Element),
}

impl ListItem {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            ListItem::Value(v) => Some(v),
            ListItem::Element(_) => None,
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            ListItem::Value(v) => Some(v),
            ListItem::Element(_) => None,
        }
    }

    pub fn into_element(self) -> Option<Element> {
        match self {
            ListItem::Element(e) => Some(e),
            ListItem::Value(_) => None,
        }
    }
}

/// Lazy, strictly sequential iterator over a continued list query.
///
/// A page is fetched only when the previous one is drained. After an error
/// the iterator is fused and yields nothing more.
pub struct ListIter<'g, T: Transport> {
    gateway: &'g mut Gateway<T>,
    query: ListQuery,
    buffer: VecDeque<ListItem>,
    pages: u32,
    finished: bool,
}

impl<'g, T: Transport> ListIter<'g, T> {
    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages
    }

    fn fetch_page(&mut self) -> Result<()> {
        let response = self
            .gateway
            .execute(self.query.request(), Some(&self.query.continue_path))?;
        self.pages += 1;

        let attribute = self.query.attribute.as_deref();
        for selected in self.query.result_path.select(response.root()) {
            let item = match (selected, attribute) {
                (Selected::Element(e), Some(attr)) => e.attr(attr).map(|v| ListItem::Value(v.to_string())),
                (Selected::Element(e), None) => Some(ListItem::Element(e.clone())),
                (Selected::Attribute { value, .. }, _) => Some(ListItem::Value(value.to_string())),
            };
            if let Some(item) = item {
                self.buffer.push_back(item);
            }
        }

        debug!(
            list = self.query.list.as_str(),
            page = self.pages,
            items = self.buffer.len(),
            continuation = ?response.continuation,
            "list page fetched"
        );

        match response.continuation {
            Some(value) => self.query.params.insert(self.query.continue_param.clone(), value),
            None => self.finished = true,
        }
        Ok(())
    }
}

impl<T: Transport> Iterator for ListIter<'_, T> {
    type Item = Result<ListItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}

impl<T: Transport> Gateway<T> {
    /// Iterate a list query lazily. Restart by calling again with the same query.
    pub fn iterate(&mut self, query: ListQuery) -> ListIter<'_, T> {
        ListIter {
            gateway: self,
            query,
            buffer: VecDeque::new(),
            pages: 0,
            finished: false,
        }
    }

    /// Run a list query to the end and collect its projected values.
    pub fn collect_list(&mut self, query: ListQuery) -> Result<Vec<String>> {
        self.iterate(query)
            .filter_map(|item| match item {
                Ok(ListItem::Value(v)) => Some(Ok(v)),
                Ok(ListItem::Element(_)) => None,
                Err(e) => Some(Err(e)),
            })
            .collect()
    }
}
