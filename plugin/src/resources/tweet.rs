use super::{Resource, ResourceKind};
use crate::config::TweetDetailContract;
use crate::error::{PluginError, PluginResult};
use crate::redact::RedactionRule;
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static STATUS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(?:x|twitter)\.com/[A-Za-z0-9_]+/status/([0-9]+)").expect("status url pattern")
});

/// Pull the tweet id out of a `https://x.com/<user>/status/<id>` tab URL.
pub(crate) fn tweet_id(tab_url: &str) -> Option<&str> {
    STATUS_URL
        .captures(tab_url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

fn encode_component(payload: Map<String, Value>) -> String {
    utf8_percent_encode(&Value::Object(payload).to_string(), URI_COMPONENT).to_string()
}

/// GraphQL `TweetDetail` for the tweet open in the active tab.
#[derive(Debug, Clone)]
pub struct Tweet {
    contract: TweetDetailContract,
}

impl Tweet {
    pub fn new(contract: TweetDetailContract) -> Self {
        Self { contract }
    }
}

impl Resource for Tweet {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Tweet
    }

    fn credential_host(&self) -> &str {
        &self.contract.credential_host
    }

    fn url(&self, tab_url: Option<&str>) -> PluginResult<String> {
        let tab_url = tab_url.ok_or_else(|| PluginError::malformed("no active tab url"))?;
        let id = tweet_id(tab_url).ok_or_else(|| {
            PluginError::malformed(format!("tab url `{tab_url}` does not point at a tweet"))
        })?;
        debug!(id, "Requesting tweet detail");

        let mut variables = Map::new();
        variables.insert("focalTweetId".into(), Value::String(id.to_string()));
        variables.extend(
            self.contract
                .variables
                .iter()
                .filter(|(key, _)| key.as_str() != "focalTweetId")
                .map(|(key, value)| (key.clone(), value.clone())),
        );

        Ok(format!(
            "{}?variables={}&features={}&fieldToggles={}",
            self.contract.operation_url(),
            encode_component(variables),
            encode_component(self.contract.features.clone()),
            encode_component(self.contract.field_toggles.clone()),
        ))
    }

    fn secret_response(&self) -> Option<&str> {
        self.contract.secret_response.as_deref()
    }

    fn redaction(&self) -> Option<&RedactionRule> {
        self.contract.redaction.as_ref()
    }
}
