//! Extism exports and host function imports.

use crate::dispatch;
use crate::host::Host;
use extism_pdk::{host_fn, plugin_fn, FnResult, Json};
use serde_json::Value;

#[host_fn]
extern "ExtismHost" {
    fn redirect(url: String);
    fn notarize(request: String) -> String;
}

/// The extension, reached through Extism config and host functions.
struct ExtismHost;

impl Host for ExtismHost {
    fn read_config(&self, key: &str) -> anyhow::Result<Option<String>> {
        extism_pdk::config::get(key)
    }

    fn redirect(&self, url: &str) -> anyhow::Result<()> {
        unsafe { redirect(url.to_string()) }
    }

    fn notarize(&self, request: &Value) -> anyhow::Result<String> {
        unsafe { notarize(request.to_string()) }
    }
}

fn run(operation: &str, input: &str) -> FnResult<Json<Value>> {
    let output = dispatch::execute(ExtismHost, operation, input)?;

    if output == Value::Bool(false) {
        extism_pdk::warn!("`{operation}` refused");
    } else {
        extism_pdk::debug!("`{operation}` completed");
    }

    Ok(Json(output))
}

#[plugin_fn]
pub fn config() -> FnResult<Json<Value>> {
    run("config", "")
}

#[plugin_fn]
pub fn start() -> FnResult<Json<Value>> {
    run("start", "")
}

#[plugin_fn]
pub fn query_account() -> FnResult<Json<Value>> {
    run("query_account", "")
}

#[plugin_fn]
pub fn parse_account(input: String) -> FnResult<Json<Value>> {
    run("parse_account", &input)
}

#[plugin_fn]
pub fn notarize_account(input: String) -> FnResult<Json<Value>> {
    run("notarize_account", &input)
}

#[plugin_fn]
pub fn query_tweet() -> FnResult<Json<Value>> {
    run("query_tweet", "")
}

#[plugin_fn]
pub fn notarize_tweet(input: String) -> FnResult<Json<Value>> {
    run("notarize_tweet", &input)
}
