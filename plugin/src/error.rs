//! Plugin error type.
//!
//! The host only ever sees `false` for the soft variants; the tag is kept so
//! tests and logs can tell the causes apart.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    /// A required cookie or header is absent or empty for the credential host
    #[error("missing credential `{field}` for {hostname}")]
    MissingCredential { hostname: String, field: String },

    /// The current tab is not on one of the allowed hosts
    #[error("tab url host `{got}` is not allowed")]
    InvalidHost { got: String },

    /// Operation input could not be used
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    /// Bundled or injected configuration is unusable
    #[error("invalid plugin configuration: {0}")]
    Config(String),

    /// A host capability call failed
    #[error("host capability failed: {0}")]
    Host(#[source] anyhow::Error),

    /// Operation output could not be encoded as JSON
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PluginError {
    pub(crate) fn missing(hostname: &str, field: &str) -> Self {
        Self::MissingCredential {
            hostname: hostname.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn malformed<S: ToString>(reason: S) -> Self {
        Self::MalformedInput {
            reason: reason.to_string(),
        }
    }

    /// Soft failures are reported to the host as `false` instead of an error.
    pub const fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::InvalidHost { .. } | Self::MalformedInput { .. }
        )
    }
}

pub type PluginResult<T> = Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_and_hard_variants() {
        assert!(PluginError::missing("x.com", "ct0").is_soft());
        assert!(PluginError::InvalidHost { got: "example.com".into() }.is_soft());
        assert!(PluginError::malformed("empty body").is_soft());

        assert!(!PluginError::Config("no hosts".into()).is_soft());
        assert!(!PluginError::Host(anyhow::anyhow!("boom")).is_soft());
    }

    #[test]
    fn test_missing_credential_message() {
        let err = PluginError::missing("api.x.com", "auth_token");
        assert_eq!(
            err.to_string(),
            "missing credential `auth_token` for api.x.com"
        );
    }
}
