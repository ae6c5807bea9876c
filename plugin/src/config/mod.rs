use crate::dispatch::OPERATIONS;
use crate::error::{PluginError, PluginResult};
use crate::host::{Host, API_CONTRACT_KEY};
use derive_builder::Builder;
use tracing::{debug, info};
use url::Url;

pub mod contract;
pub mod manifest;

pub use contract::{AccountContract, ApiContract, TweetDetailContract};
pub use manifest::{Manifest, RequestRule};

const BUNDLED_MANIFEST: &str = include_str!("../../assets/config.json");
const BUNDLED_CONTRACT: &str = include_str!("../../assets/contract.json");

/// Everything the plugin reads at startup: the manifest it hands to the host
/// and the API contract its requests are built from.
#[derive(Builder, Clone, Debug)]
#[builder(pattern = "owned")]
pub struct PluginConfig {
    pub(crate) manifest: Manifest,
    pub(crate) contract: ApiContract,
}

impl PluginConfig {
    pub fn builder() -> PluginConfigBuilder {
        PluginConfigBuilder::default()
    }

    /// The configuration compiled into the plugin.
    pub fn bundled() -> PluginResult<Self> {
        Self::from_parts(BUNDLED_MANIFEST, BUNDLED_CONTRACT)
    }

    /// Bundled manifest plus the host's `apiContract`, if it set one.
    pub fn load<H: Host>(host: &H) -> PluginResult<Self> {
        match host.read_config(API_CONTRACT_KEY).map_err(PluginError::Host)? {
            Some(contract) => {
                let config = Self::from_parts(BUNDLED_MANIFEST, &contract)?;
                info!(
                    "Using host supplied API contract `{}`",
                    config.contract.version
                );
                Ok(config)
            }
            None => Self::bundled(),
        }
    }

    pub fn from_parts(manifest: &str, contract: &str) -> PluginResult<Self> {
        let manifest = Manifest::parse(manifest)?;
        let contract: ApiContract = serde_json::from_str(contract)
            .map_err(|e| PluginError::Config(format!("API contract is malformed: {e}")))?;

        let config = Self::builder()
            .manifest(manifest)
            .contract(contract)
            .build()
            .map_err(|e| PluginError::Config(e.to_string()))?;

        config.validate()?;
        debug!("Loaded API contract `{}`", config.contract.version);

        Ok(config)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn contract(&self) -> &ApiContract {
        &self.contract
    }

    fn validate(&self) -> PluginResult<()> {
        let contract = &self.contract;

        if contract.allowed_hosts.is_empty() {
            return Err(PluginError::Config("no allowed hosts configured".into()));
        }

        Url::parse(&contract.fallback_url).map_err(|e| {
            PluginError::Config(format!(
                "fallback url `{}` is invalid: {e}",
                contract.fallback_url
            ))
        })?;

        let endpoints = [
            contract.account.endpoint.clone(),
            contract.tweet_detail.operation_url(),
        ];
        for endpoint in endpoints {
            if !self.manifest.allows(&endpoint, "GET") {
                return Err(PluginError::Config(format!(
                    "endpoint `{endpoint}` is not listed in the manifest requests"
                )));
            }
        }

        if let Some(action) = self.manifest.actions().find(|a| !OPERATIONS.contains(a)) {
            return Err(PluginError::Config(format!(
                "manifest step `{action}` is not an exported operation"
            )));
        }

        let handlers = [
            contract.account.secret_response.as_deref(),
            contract.tweet_detail.secret_response.as_deref(),
        ];
        if let Some(handler) = handlers
            .into_iter()
            .flatten()
            .find(|h| !OPERATIONS.contains(h))
        {
            return Err(PluginError::Config(format!(
                "secret response handler `{handler}` is not an exported operation"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::MockHost;
    use serde_json::Value;

    fn bundled_contract() -> Value {
        serde_json::from_str(BUNDLED_CONTRACT).unwrap()
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let config = PluginConfig::bundled().unwrap();
        assert_eq!(config.manifest().requests().len(), 2);
        assert_eq!(config.contract().fallback_url, "https://x.com");
    }

    #[test]
    fn test_host_contract_replaces_bundled() {
        let mut contract = bundled_contract();
        contract["version"] = "injected".into();
        contract["tweetDetail"]["queryId"] = "NewQueryId".into();

        let host = MockHost::new().with_config(API_CONTRACT_KEY, &contract.to_string());
        let config = PluginConfig::load(&host).unwrap();

        assert_eq!(config.contract().version, "injected");
        assert_eq!(config.contract().tweet_detail.query_id, "NewQueryId");
    }

    #[test]
    fn test_endpoint_outside_manifest_is_rejected() {
        let mut contract = bundled_contract();
        contract["account"]["endpoint"] = "https://api.x.com/1.1/users/show.json".into();

        let err = PluginConfig::from_parts(BUNDLED_MANIFEST, &contract.to_string()).unwrap_err();
        assert!(matches!(err, PluginError::Config(_)));
    }

    #[test]
    fn test_empty_allowed_hosts_is_rejected() {
        let mut contract = bundled_contract();
        contract["allowedHosts"] = Value::Array(vec![]);

        let err = PluginConfig::from_parts(BUNDLED_MANIFEST, &contract.to_string()).unwrap_err();
        assert!(matches!(err, PluginError::Config(_)));
    }

    #[test]
    fn test_unknown_secret_response_handler_is_rejected() {
        let mut contract = bundled_contract();
        contract["account"]["secretResponse"] = "parse_profile".into();

        let err = PluginConfig::from_parts(BUNDLED_MANIFEST, &contract.to_string()).unwrap_err();
        assert!(matches!(err, PluginError::Config(_)));
    }

    #[test]
    fn test_malformed_host_contract_is_a_config_error() {
        let host = MockHost::new().with_config(API_CONTRACT_KEY, "{\"version\": 1}");
        assert!(matches!(
            PluginConfig::load(&host),
            Err(PluginError::Config(_))
        ));
    }
}
