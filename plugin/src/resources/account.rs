use super::{Resource, ResourceKind};
use crate::config::AccountContract;
use crate::error::PluginResult;
use crate::redact::RedactionRule;

/// `1.1/account/settings.json`: the logged-in user's settings, including
/// `screen_name`.
#[derive(Debug, Clone)]
pub struct Account {
    contract: AccountContract,
}

impl Account {
    pub fn new(contract: AccountContract) -> Self {
        Self { contract }
    }
}

impl Resource for Account {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Account
    }

    fn credential_host(&self) -> &str {
        &self.contract.credential_host
    }

    fn url(&self, _tab_url: Option<&str>) -> PluginResult<String> {
        Ok(self.contract.endpoint.clone())
    }

    fn secret_response(&self) -> Option<&str> {
        self.contract.secret_response.as_deref()
    }

    fn redaction(&self) -> Option<&RedactionRule> {
        self.contract.redaction.as_ref()
    }
}
