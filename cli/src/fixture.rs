//! Recorded browser sessions standing in for the extension host.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use x_profile_plugin::host::{API_CONTRACT_KEY, TAB_URL_KEY};
use x_profile_plugin::{CredentialSource, Host};

type CredentialStore = BTreeMap<String, BTreeMap<String, String>>;

/// What the extension would have captured from the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFixture {
    #[serde(default)]
    pub tab_url: Option<String>,
    /// Cookies per hostname
    #[serde(default)]
    pub cookies: CredentialStore,
    /// Request headers per hostname
    #[serde(default)]
    pub headers: CredentialStore,
    /// API contract to use instead of the bundled one
    #[serde(default)]
    pub api_contract: Option<Value>,
}

impl SessionFixture {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file `{}`", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Session file `{}` is malformed", path.display()))
    }
}

/// Host that answers from a [`SessionFixture`] and never contacts a notary.
///
/// `notarize` records the request and hands back `dry-run-<n>`.
#[derive(Debug, Default)]
pub struct DryRunHost {
    fixture: SessionFixture,
    redirects: RefCell<Vec<String>>,
    notarized: RefCell<Vec<Value>>,
    counter: Cell<usize>,
}

impl DryRunHost {
    pub fn new(fixture: SessionFixture) -> Self {
        Self {
            fixture,
            ..Default::default()
        }
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.borrow().clone()
    }

    pub fn notarized(&self) -> Vec<Value> {
        self.notarized.borrow().clone()
    }
}

impl Host for DryRunHost {
    fn read_config(&self, key: &str) -> Result<Option<String>> {
        let store = match key {
            TAB_URL_KEY => return Ok(self.fixture.tab_url.clone()),
            API_CONTRACT_KEY => return Ok(self.fixture.api_contract.as_ref().map(Value::to_string)),
            k if k == CredentialSource::Cookies.config_key() => &self.fixture.cookies,
            k if k == CredentialSource::Headers.config_key() => &self.fixture.headers,
            _ => return Ok(None),
        };
        Ok(Some(serde_json::to_string(store)?))
    }

    fn redirect(&self, url: &str) -> Result<()> {
        info!(target: "plain", "↪ plugin asked the tab to open {url}");
        self.redirects.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn notarize(&self, request: &Value) -> Result<String> {
        let handle = self.counter.get() + 1;
        self.counter.set(handle);

        debug!(
            "Dry-run notarization request: {}",
            serde_json::to_string_pretty(&censor_secrets(request))?
        );
        self.notarized.borrow_mut().push(request.clone());

        Ok(format!("dry-run-{handle}"))
    }
}

/// Copy of `request` with every secret header value replaced by X's.
pub(crate) fn censor_secrets(request: &Value) -> Value {
    let mut censored = request.clone();

    let secret_names: Vec<String> = request["secretHeaders"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .filter_map(|line| line.split_once(':').map(|(name, _)| name.trim().to_string()))
        .collect();

    if let Some(headers) = censored["headers"].as_object_mut() {
        for (name, value) in headers.iter_mut() {
            if secret_names.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                let len = value.as_str().map_or(0, str::len);
                *value = Value::String("X".repeat(len));
            }
        }
    }

    if let Some(lines) = censored["secretHeaders"].as_array_mut() {
        for line in lines.iter_mut() {
            if let Some((name, secret)) = line.as_str().and_then(|l| l.split_once(": ")) {
                *line = Value::String(format!("{name}: {}", "X".repeat(secret.len())));
            }
        }
    }

    censored
}
