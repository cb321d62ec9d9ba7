//! Cache-busting video URLs.
//!
//! The endpoint answers every request with a different random video, so the
//! only thing that matters is that no cache between us and it replays an old
//! response. Appending the current time in milliseconds is enough for that.

use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// Query parameter carrying the timestamp.
pub const CACHE_BUST_PARAM: &str = "t";

/// The fixed random-video endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        Ok(Endpoint {
            base: Url::parse(base)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Fetch target for the given timestamp.
    pub fn url_at(&self, millis: u64) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair(CACHE_BUST_PARAM, &millis.to_string());
        url
    }

    /// Fetch target for the current wall-clock time.
    pub fn url(&self) -> Url {
        self.url_at(now_millis())
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::new(crate::config::DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
