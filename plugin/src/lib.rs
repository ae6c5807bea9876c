//! X (Twitter) plugin for the TLSNotary browser extension.
//!
//! Proves ownership of an X profile (`account/settings.json`) and the content
//! of a tweet (`TweetDetail`). The plugin only decides which request to make
//! and which parts of it stay secret; the extension performs the request and
//! the notarization through host functions.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod redact;
pub mod request;
pub mod resources;

#[cfg(target_arch = "wasm32")]
mod exports;

pub use config::{ApiContract, Manifest, PluginConfig};
pub use dispatch::{execute, respond, Plugin, OPERATIONS};
pub use error::{PluginError, PluginResult};
pub use host::{CredentialSource, Host, SessionCredentials};
pub use redact::{Redaction, RedactionRule, RedactionScope};
pub use request::{Header, RequestDescriptor};
pub use resources::ResourceKind;
