//! Download endpoint: maps a download ID to its request URL.

use anyhow::{Context, Result};
use url::Url;

/// The fixed endpoint every ID is requested from:
/// `<base>?route=<route>&download_id=<id>`.
#[derive(Debug, Clone)]
pub struct Endpoint {
    base: Url,
    route: String,
}

impl Endpoint {
    /// Parses `base_url`. Any query string or fragment on it is dropped.
    pub fn new(base_url: &str, route: &str) -> Result<Self> {
        let mut base =
            Url::parse(base_url).with_context(|| format!("invalid base URL: {}", base_url))?;
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            base,
            route: route.to_string(),
        })
    }

    /// Request URL for download `id`. The route goes out as written (`/` stays
    /// literal); only characters invalid in a query are percent-encoded.
    pub fn url_for(&self, id: u64) -> String {
        let mut url = self.base.clone();
        url.set_query(Some(&format!("route={}&download_id={}", self.route, id)));
        url.into()
    }
}
