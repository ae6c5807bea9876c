//! Host capability surface.
//!
//! Everything the plugin knows about the outside world arrives through
//! [`Host`]: configuration values set by the runtime, the browser session's
//! cookies and headers, and the `redirect` / `notarize` host functions.

use crate::error::{PluginError, PluginResult};
use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Config key holding the URL of the active browser tab.
pub const TAB_URL_KEY: &str = "tabUrl";
/// Config key holding an API contract that replaces the bundled one.
pub const API_CONTRACT_KEY: &str = "apiContract";

/// Where a session credential is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CredentialSource {
    Cookies,
    Headers,
}

impl CredentialSource {
    /// Host config key carrying the credential store for this source.
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Cookies => "cookies",
            Self::Headers => "headers",
        }
    }
}

/// Capabilities provided by the embedding runtime.
pub trait Host {
    /// Read a configuration value set by the host. Absent keys are `None`.
    fn read_config(&self, key: &str) -> Result<Option<String>>;

    /// Ask the host to navigate the active tab elsewhere.
    fn redirect(&self, url: &str) -> Result<()>;

    /// Submit a request descriptor for notarization, returning the host's handle.
    fn notarize(&self, request: &Value) -> Result<String>;

    /// Cookies or headers captured by the host for `hostname`.
    ///
    /// The host publishes each source as a JSON object keyed by hostname (or by
    /// a URL on that hostname). A hostname the host knows nothing about yields
    /// an empty set; a store that is not such an object is malformed input.
    fn credentials(
        &self,
        source: CredentialSource,
        hostname: &str,
    ) -> PluginResult<SessionCredentials> {
        match self.read_config(source.config_key()).map_err(PluginError::Host)? {
            Some(raw) => SessionCredentials::from_store(&raw, hostname).map_err(|err| {
                PluginError::malformed(format!("{source} store for {hostname}: {err}"))
            }),
            None => Ok(SessionCredentials::default()),
        }
    }
}

impl<H: Host + ?Sized> Host for &H {
    fn read_config(&self, key: &str) -> Result<Option<String>> {
        (**self).read_config(key)
    }

    fn redirect(&self, url: &str) -> Result<()> {
        (**self).redirect(url)
    }

    fn notarize(&self, request: &Value) -> Result<String> {
        (**self).notarize(request)
    }

    fn credentials(
        &self,
        source: CredentialSource,
        hostname: &str,
    ) -> PluginResult<SessionCredentials> {
        (**self).credentials(source, hostname)
    }
}

/// Name/value pairs of one credential source for one hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SessionCredentials(BTreeMap<String, String>);

impl SessionCredentials {
    /// Pick the entry for `hostname` out of a host credential store.
    pub fn from_store(raw: &str, hostname: &str) -> serde_json::Result<Self> {
        let mut store: BTreeMap<String, SessionCredentials> = serde_json::from_str(raw)?;

        if let Some(credentials) = store.remove(hostname) {
            return Ok(credentials);
        }

        let by_url = store.into_iter().find_map(|(key, credentials)| {
            let url = Url::parse(&key).ok()?;
            (url.host_str() == Some(hostname)).then_some(credentials)
        });

        Ok(by_url.unwrap_or_default())
    }

    /// Look up a value; exact name first, then ASCII case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SessionCredentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_lookup_by_hostname() {
        let raw = r#"{"api.x.com":{"ct0":"a"},"x.com":{"ct0":"b"}}"#;

        let credentials = SessionCredentials::from_store(raw, "x.com").unwrap();
        assert_eq!(credentials.get("ct0"), Some("b"));
    }

    #[test]
    fn test_store_lookup_by_url_key() {
        let raw = r#"{"https://api.x.com/1.1/account/settings.json":{"auth_token":"t"}}"#;

        let credentials = SessionCredentials::from_store(raw, "api.x.com").unwrap();
        assert_eq!(credentials.get("auth_token"), Some("t"));
        assert!(SessionCredentials::from_store(raw, "x.com").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_hostname_is_empty() {
        let credentials = SessionCredentials::from_store("{}", "x.com").unwrap();
        assert!(credentials.is_empty());
    }

    #[test]
    fn test_malformed_store_is_an_error() {
        assert!(SessionCredentials::from_store("[1, 2]", "x.com").is_err());
        assert!(SessionCredentials::from_store("not json", "x.com").is_err());
    }

    #[test]
    fn test_malformed_store_is_soft() {
        let host = mock::MockHost::new().with_config("cookies", "not json");

        let err = host
            .credentials(CredentialSource::Cookies, "x.com")
            .unwrap_err();
        assert!(err.is_soft());
        assert!(host
            .credentials(CredentialSource::Headers, "x.com")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let credentials: SessionCredentials = [("Authorization", "Bearer x")].into_iter().collect();
        assert_eq!(credentials.get("authorization"), Some("Bearer x"));
        assert_eq!(credentials.get("cookie"), None);
    }
}
