//! Resources the plugin knows how to request from the X API.

mod account;
mod tweet;

pub use account::Account;
pub use tweet::Tweet;

use crate::config::ApiContract;
use crate::error::PluginResult;
use crate::redact::RedactionRule;
use enum_dispatch::enum_dispatch;
use strum::{Display, EnumString};

/// Resource selector, as used in exported operation names (`query_account`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Account,
    Tweet,
}

#[enum_dispatch]
pub trait Resource {
    fn kind(&self) -> ResourceKind;

    /// Hostname whose cookies and headers authenticate the request
    fn credential_host(&self) -> &str;

    /// Full request URL. `tab_url` is the active browser tab, if the host set one.
    fn url(&self, tab_url: Option<&str>) -> PluginResult<String>;

    /// Exported operation the host calls back for the revealed response parts
    fn secret_response(&self) -> Option<&str> {
        None
    }

    /// How the response of this resource is redacted
    fn redaction(&self) -> Option<&RedactionRule> {
        None
    }
}

#[enum_dispatch(Resource)]
#[derive(Debug, Clone)]
pub enum ApiResource {
    Account,
    Tweet,
}

impl ApiResource {
    pub fn from_contract(kind: ResourceKind, contract: &ApiContract) -> Self {
        match kind {
            ResourceKind::Account => Account::new(contract.account.clone()).into(),
            ResourceKind::Tweet => Tweet::new(contract.tweet_detail.clone()).into(),
        }
    }
}
