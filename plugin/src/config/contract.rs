use crate::redact::RedactionRule;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_client_language() -> String {
    "en".into()
}

/// The shape of the private X API this plugin was written against.
///
/// Endpoints, GraphQL query ids and feature flags change upstream without
/// notice; they live here so that following the API is a data change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContract {
    /// Free-form version tag, reported in logs
    pub version: String,
    /// Hostnames the active tab must be on for `start` to succeed
    pub allowed_hosts: Vec<String>,
    /// Where `start` sends the tab when it is somewhere else
    pub fallback_url: String,
    /// Value of the `x-twitter-client-language` header and the `lang` cookie
    #[serde(default = "default_client_language")]
    pub client_language: String,
    pub account: AccountContract,
    pub tweet_detail: TweetDetailContract,
}

/// Account settings endpoint (REST).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountContract {
    /// Hostname whose cookies and headers authenticate the request
    pub credential_host: String,
    pub endpoint: String,
    /// Exported operation the host calls to learn the revealed response parts
    #[serde(default)]
    pub secret_response: Option<String>,
    #[serde(default)]
    pub redaction: Option<RedactionRule>,
}

/// Tweet detail endpoint (GraphQL).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetDetailContract {
    pub credential_host: String,
    /// GraphQL base, without query id and operation name
    pub endpoint: String,
    pub query_id: String,
    pub operation: String,
    /// Query variables sent alongside `focalTweetId`
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub features: Map<String, Value>,
    #[serde(default)]
    pub field_toggles: Map<String, Value>,
    #[serde(default)]
    pub secret_response: Option<String>,
    #[serde(default)]
    pub redaction: Option<RedactionRule>,
}

impl TweetDetailContract {
    /// Operation URL without the query string.
    pub fn operation_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.query_id,
            self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redact::RedactionScope;

    const BUNDLED: &str = include_str!("../../assets/contract.json");

    #[test]
    fn test_bundled_contract_parses() {
        let contract: ApiContract = serde_json::from_str(BUNDLED).unwrap();

        assert_eq!(contract.allowed_hosts, ["twitter.com", "x.com"]);
        assert_eq!(contract.account.credential_host, "api.x.com");
        assert_eq!(contract.account.secret_response.as_deref(), Some("parse_account"));

        let redaction = contract.account.redaction.unwrap();
        assert_eq!(redaction.field, "screen_name");
        assert_eq!(redaction.scope, RedactionScope::First);

        assert!(contract.tweet_detail.secret_response.is_none());
        assert_eq!(contract.tweet_detail.field_toggles.len(), 3);
    }

    #[test]
    fn test_feature_order_is_kept() {
        let contract: ApiContract = serde_json::from_str(BUNDLED).unwrap();
        let first = contract.tweet_detail.features.keys().next().unwrap();
        assert_eq!(first, "rweb_tipjar_consumption_enabled");
    }

    #[test]
    fn test_operation_url() {
        let contract: ApiContract = serde_json::from_str(BUNDLED).unwrap();
        assert_eq!(
            contract.tweet_detail.operation_url(),
            "https://x.com/i/api/graphql/QVo2zKMcLZjXABtcYpi0mA/TweetDetail"
        );
    }
}
