//! Address-bar capability used for token discovery and logout navigation.

use std::sync::{Mutex, PoisonError};

use url::Url;

/// The page address the bridge reads from and rewrites.
pub trait Location: Send + Sync {
    fn current(&self) -> Url;

    /// Swap the visible address without adding a history entry.
    fn replace(&self, url: Url);

    /// Regular navigation to `target`, resolved against the current address.
    fn navigate(&self, target: &str);
}

/// First value of query parameter `name`, if present and non-empty.
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// `url` without any `name` pairs; remaining pairs keep their order.
pub fn without_query_param(url: &Url, name: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    stripped
}

/// In-process location for the CLI and tests. Records navigations.
#[derive(Debug)]
pub struct StaticLocation {
    current: Mutex<Url>,
    navigations: Mutex<Vec<Url>>,
}

impl StaticLocation {
    pub fn new(url: Url) -> Self {
        Self {
            current: Mutex::new(url),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn parse(href: &str) -> Result<Self, url::ParseError> {
        Url::parse(href).map(Self::new)
    }

    /// Addresses reached through [`Location::navigate`], oldest first.
    pub fn navigations(&self) -> Vec<Url> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Location for StaticLocation {
    fn current(&self) -> Url {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace(&self, url: Url) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = url;
    }

    fn navigate(&self, href: &str) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.join(href) {
            Ok(next) => {
                self.navigations
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(next.clone());
                *current = next;
            }
            Err(err) => tracing::warn!(href, "ignoring navigation to unparsable address: {err}"),
        }
    }
}
