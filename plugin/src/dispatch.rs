//! Entry-point dispatcher.
//!
//! The host runs the exported operations one at a time, in the order the
//! manifest lists them. Each call builds a fresh [`Plugin`]; nothing is kept
//! between calls.

use crate::config::{Manifest, PluginConfig};
use crate::error::{PluginError, PluginResult};
use crate::host::{CredentialSource, Host, TAB_URL_KEY};
use crate::request::{RequestDescriptor, SessionAuth, SECRET_HEADER_ORDER};
use crate::resources::{ApiResource, Resource, ResourceKind};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

/// Names of the operations exported to the host.
pub const OPERATIONS: [&str; 7] = [
    "config",
    "start",
    "query_account",
    "parse_account",
    "notarize_account",
    "query_tweet",
    "notarize_tweet",
];

/// Request field naming the operation the host calls back for revealed
/// response ranges.
const SECRET_RESPONSE_FIELD: &str = "getSecretResponse";

pub struct Plugin<H> {
    host: H,
    config: PluginConfig,
}

impl<H: Host> Plugin<H> {
    /// Load the configuration (bundled, or overridden by the host) and bind it to `host`.
    pub fn new(host: H) -> PluginResult<Self> {
        let config = PluginConfig::load(&host)?;
        Ok(Self::with_config(host, config))
    }

    pub fn with_config(host: H, config: PluginConfig) -> Self {
        Self { host, config }
    }

    /// The manifest, exactly as bundled.
    pub fn manifest(&self) -> &Value {
        self.config.manifest().as_value()
    }

    /// Admission check: the active tab must be on an allowed host.
    ///
    /// Otherwise the tab is redirected to the fallback URL and the call fails
    /// with [`PluginError::InvalidHost`].
    pub fn start(&self) -> PluginResult<bool> {
        let contract = self.config.contract();
        let tab_url = self.tab_url()?.unwrap_or_default();

        let hostname = Url::parse(&tab_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned));

        match hostname {
            Some(hostname) if contract.allowed_hosts.contains(&hostname) => {
                debug!(%hostname, "Tab is on an allowed host");
                Ok(true)
            }
            hostname => {
                info!("Redirecting tab to {}", contract.fallback_url);
                self.host
                    .redirect(&contract.fallback_url)
                    .map_err(PluginError::Host)?;
                Err(PluginError::InvalidHost {
                    got: hostname.unwrap_or(tab_url),
                })
            }
        }
    }

    /// Build the request descriptor for `kind` from the captured session.
    pub fn query(&self, kind: ResourceKind) -> PluginResult<RequestDescriptor> {
        let resource = self.resource(kind);
        let hostname = resource.credential_host();

        let cookies = self.host.credentials(CredentialSource::Cookies, hostname)?;
        let headers = self.host.credentials(CredentialSource::Headers, hostname)?;
        let auth = SessionAuth::from_session(hostname, &cookies, &headers)?;

        let tab_url = self.tab_url()?;
        let url = resource.url(tab_url.as_deref())?;

        let headers = auth.headers(hostname, &self.config.contract().client_language);
        let request =
            RequestDescriptor::new(url, "GET", headers).with_secret_order(&SECRET_HEADER_ORDER);
        debug!(
            %kind,
            url = %request.url,
            secret_headers = request.secret_headers.len(),
            "Built request descriptor"
        );

        Ok(request)
    }

    /// Revealed parts of a `kind` response body.
    pub fn parse(&self, kind: ResourceKind, body: &str) -> PluginResult<Vec<String>> {
        let resource = self.resource(kind);
        let rule = resource.redaction().ok_or_else(|| {
            PluginError::malformed(format!("{kind} responses have no redaction rule"))
        })?;

        let redaction = rule.redact(body)?;

        Ok(redaction
            .revealed_segments(body)
            .into_iter()
            .map(str::to_owned)
            .collect())
    }

    /// Submit a request descriptor (as produced by [`Plugin::query`]) for notarization.
    pub fn notarize(&self, kind: ResourceKind, input: &str) -> PluginResult<String> {
        let params: Value = serde_json::from_str(input).map_err(|e| {
            PluginError::malformed(format!("notarization request is not JSON: {e}"))
        })?;
        let Value::Object(mut request) = params else {
            return Err(PluginError::malformed(
                "notarization request must be a JSON object",
            ));
        };

        let resource = self.resource(kind);
        if let Some(handler) = resource.secret_response() {
            request.insert(SECRET_RESPONSE_FIELD.into(), Value::from(handler));
        }

        let handle = self
            .host
            .notarize(&Value::Object(request))
            .map_err(PluginError::Host)?;
        info!(%kind, "Notarization submitted");

        Ok(handle)
    }

    /// Run an exported operation by name and produce the JSON the host receives.
    ///
    /// `input` is the raw operation input; operations that take none ignore it.
    pub fn call(&self, operation: &str, input: &str) -> PluginResult<Value> {
        use ResourceKind::{Account, Tweet};

        match operation {
            "config" => Ok(self.manifest().clone()),
            "start" => respond(operation, self.start()),
            "query_account" => respond(operation, self.query(Account)),
            "parse_account" => respond(operation, self.parse(Account, input)),
            "notarize_account" => respond(operation, self.notarize(Account, input)),
            "query_tweet" => respond(operation, self.query(Tweet)),
            "notarize_tweet" => respond(operation, self.notarize(Tweet, input)),
            other => Err(PluginError::malformed(format!(
                "unknown operation `{other}`"
            ))),
        }
    }

    fn resource(&self, kind: ResourceKind) -> ApiResource {
        ApiResource::from_contract(kind, self.config.contract())
    }

    fn tab_url(&self) -> PluginResult<Option<String>> {
        self.host.read_config(TAB_URL_KEY).map_err(PluginError::Host)
    }
}

/// Run one exported operation against `host`.
///
/// `config` serves the bundled manifest without loading the API contract, so
/// a broken `apiContract` never keeps the host from reading the manifest.
pub fn execute<H: Host>(host: H, operation: &str, input: &str) -> PluginResult<Value> {
    if operation == "config" {
        return Ok(Manifest::bundled()?.as_value().clone());
    }

    Plugin::new(host)?.call(operation, input)
}

/// Collapse an operation result into the JSON the host receives: soft
/// failures become `false`, hard ones stay errors.
pub fn respond<T: Serialize>(operation: &str, result: PluginResult<T>) -> PluginResult<Value> {
    match result {
        Ok(output) => Ok(serde_json::to_value(output)?),
        Err(err) if err.is_soft() => {
            warn!(operation, "Refused: {err}");
            Ok(Value::Bool(false))
        }
        Err(err) => Err(err),
    }
}
