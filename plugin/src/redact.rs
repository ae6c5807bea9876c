//! Response redaction.
//!
//! The host asks which parts of a notarized response may be revealed. We
//! answer with the body split around the serialized sensitive field, so the
//! verifier sees the whole structure except the `"field":"value"` pair.

use crate::error::{PluginError, PluginResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Range;
use tracing::debug;

/// Which occurrences of the serialized field are kept secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionScope {
    /// Only the first occurrence; later identical text stays revealed.
    #[default]
    First,
    /// Every non-overlapping occurrence.
    All,
}

/// Names the response field whose value must not be revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRule {
    pub field: String,
    #[serde(default)]
    pub scope: RedactionScope,
}

/// Byte ranges of a response body, split into secret and revealed parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub secret: Vec<Range<usize>>,
    pub revealed: Vec<Range<usize>>,
}

impl Redaction {
    /// Build from sorted, non-overlapping secret ranges over a body of `len` bytes.
    fn from_secret(len: usize, secret: Vec<Range<usize>>) -> Self {
        let mut revealed = Vec::with_capacity(secret.len() + 1);
        let mut cursor = 0;
        for range in &secret {
            revealed.push(cursor..range.start);
            cursor = range.end;
        }
        revealed.push(cursor..len);

        Self { secret, revealed }
    }

    /// The revealed parts of `body`, in order.
    pub fn revealed_segments<'a>(&self, body: &'a str) -> Vec<&'a str> {
        self.revealed.iter().map(|range| &body[range.clone()]).collect()
    }
}

impl RedactionRule {
    /// Redact `body`, a JSON response that carries the sensitive field itself.
    ///
    /// Fails softly when the body is not JSON, the field is missing, empty or
    /// not a string, or its serialized form does not occur in the text.
    pub fn redact(&self, body: &str) -> PluginResult<Redaction> {
        let params: Value = serde_json::from_str(body)
            .map_err(|e| PluginError::malformed(format!("response body is not JSON: {e}")))?;

        let value = match params.get(&self.field) {
            Some(Value::String(value)) if !value.is_empty() => value,
            _ => {
                return Err(PluginError::malformed(format!(
                    "response has no `{}` to redact",
                    self.field
                )))
            }
        };

        // Display on a JSON string yields its escaped, quoted form.
        let needle = format!(
            "{}:{}",
            Value::from(self.field.as_str()),
            Value::from(value.as_str())
        );

        let secret: Vec<Range<usize>> = match self.scope {
            RedactionScope::First => body
                .find(&needle)
                .map(|start| start..start + needle.len())
                .into_iter()
                .collect(),
            RedactionScope::All => body
                .match_indices(&needle)
                .map(|(start, found)| start..start + found.len())
                .collect(),
        };

        if secret.is_empty() {
            return Err(PluginError::malformed(format!(
                "`{}` is not serialized compactly in the response",
                self.field
            )));
        }

        let redaction = Redaction::from_secret(body.len(), secret);
        debug!(
            field = %self.field,
            secret = ?redaction.secret,
            "Redacted response body"
        );

        Ok(redaction)
    }
}
