//! Site metadata via `meta=siteinfo`.

use crate::params::RequestParams;
use crate::protocol::{DocPath, ProtocolError};
use crate::transport::Transport;
use crate::Result;
use std::collections::BTreeMap;

use super::core::Gateway;

impl<T: Transport> Gateway<T> {
    /// Attributes of `query/general`: site name, generator, base URL and so on.
    pub fn siteinfo(&mut self) -> Result<BTreeMap<String, String>> {
        let response = self.execute(RequestParams::query().with("meta", "siteinfo"), None)?;
        let general = DocPath::absolute()
            .descendant("query")
            .child("general")
            .first_element(response.root())
            .ok_or_else(|| ProtocolError::missing("query", "//query/general"))?;
        Ok(general.attribute_map())
    }

    /// MediaWiki version, e.g. `1.16alpha` from generator `MediaWiki 1.16alpha`.
    pub fn version(&mut self) -> Result<Option<String>> {
        let info = self.siteinfo()?;
        Ok(info
            .get("generator")
            .and_then(|g| g.split_whitespace().last())
            .map(str::to_string))
    }

    /// Canonical namespace name to id. The main namespace has no canonical
    /// name and is keyed by `""`.
    pub fn namespaces_by_prefix(&mut self) -> Result<BTreeMap<String, i64>> {
        let response = self.execute(
            RequestParams::query()
                .with("meta", "siteinfo")
                .with("siprop", "namespaces"),
            None,
        )?;
        let path = DocPath::absolute().descendant("ns");
        Ok(path
            .select(response.root())
            .into_iter()
            .filter_map(|s| s.as_element())
            .filter_map(|ns| {
                let id = ns.attr("id")?.parse().ok()?;
                Some((ns.attr("canonical").unwrap_or_default().to_string(), id))
            })
            .collect())
    }

    /// Installed extensions, name to version (absent for unversioned ones).
    pub fn extensions(&mut self) -> Result<BTreeMap<String, Option<String>>> {
        let response = self.execute(
            RequestParams::query()
                .with("meta", "siteinfo")
                .with("siprop", "extensions"),
            None,
        )?;
        let path = DocPath::absolute().descendant("ext");
        Ok(path
            .select(response.root())
            .into_iter()
            .filter_map(|s| s.as_element())
            .map(|ext| {
                (
                    ext.attr("name").unwrap_or_default().to_string(),
                    ext.attr("version").map(str::to_string),
                )
            })
            .collect())
    }
}
