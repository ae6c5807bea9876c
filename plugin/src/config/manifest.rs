use crate::error::{PluginError, PluginResult};
use serde::Deserialize;
use serde_json::Value;

/// A request the host is allowed to make, as listed in the manifest.
/// `*` in the url matches any run of characters.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestRule {
    pub url: String,
    pub method: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Step {
    action: String,
}

/// The plugin manifest handed to the host by `config()`.
///
/// The raw document is kept as loaded so the host receives it unmodified; the
/// typed parts are only used for validation.
#[derive(Debug, Clone)]
pub struct Manifest {
    raw: Value,
    steps: Vec<Step>,
    requests: Vec<RequestRule>,
}

#[derive(Deserialize)]
struct ManifestView {
    #[serde(default)]
    steps: Vec<Step>,
    #[serde(default)]
    requests: Vec<RequestRule>,
}

impl Manifest {
    /// The manifest compiled into the plugin.
    pub fn bundled() -> PluginResult<Self> {
        Self::parse(super::BUNDLED_MANIFEST)
    }

    pub fn parse(raw: &str) -> PluginResult<Self> {
        let raw: Value = serde_json::from_str(raw)
            .map_err(|e| PluginError::Config(format!("manifest is not valid JSON: {e}")))?;
        let view = ManifestView::deserialize(&raw)
            .map_err(|e| PluginError::Config(format!("manifest has an unexpected shape: {e}")))?;

        Ok(Self {
            raw,
            steps: view.steps,
            requests: view.requests,
        })
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Step actions, in the order the host runs them.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.action.as_str())
    }

    pub fn requests(&self) -> &[RequestRule] {
        &self.requests
    }

    /// Whether the host will accept a request to `url` with `method`.
    pub fn allows(&self, url: &str, method: &str) -> bool {
        self.requests
            .iter()
            .any(|rule| rule.method.eq_ignore_ascii_case(method) && glob_match(&rule.url, url))
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    let Some((first, rest)) = segments.split_first() else {
        return text.is_empty();
    };
    let Some(mut remaining) = text.strip_prefix(first) else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };

    for segment in middle {
        match remaining.find(segment) {
            Some(at) => remaining = &remaining[at + segment.len()..],
            None => return false,
        }
    }

    remaining.ends_with(last)
}
