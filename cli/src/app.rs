use crate::args::{Cli, Command};
use crate::fixture::{DryRunHost, SessionFixture};
use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::console::style;
use serde_json::Value;
use std::path::Path;
use tracing::info;
use x_profile_plugin::{execute, respond, Plugin, ResourceKind};

pub struct Application {
    command: Command,
    fixture: SessionFixture,
}

impl Application {
    pub fn init() -> Result<Application> {
        // Preload environment variables from .env file if it exists before parsing CLI args
        dotenvy::dotenv().ok();

        let cli = Cli::parse();

        let mut fixture = match &cli.session {
            Some(path) => SessionFixture::load(path)?,
            None => SessionFixture::default(),
        };
        if let Some(tab_url) = cli.tab_url {
            fixture.tab_url = Some(tab_url);
        }

        print_session_summary(&fixture);

        Ok(Application {
            command: cli.cmd,
            fixture,
        })
    }

    pub fn run(self) -> Result<()> {
        let host = DryRunHost::new(self.fixture.clone());
        let output = self.execute(&host)?;

        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(())
    }

    fn execute(&self, host: &DryRunHost) -> Result<Value> {
        let plugin = || Plugin::new(host).context("Failed to load plugin configuration");

        let output = match &self.command {
            Command::Manifest => execute(host, "config", "")?,
            Command::Start => respond("start", plugin()?.start())?,
            Command::Query { resource } => {
                respond(&format!("query_{resource}"), plugin()?.query(*resource))?
            }
            Command::Parse { resource, body } => {
                let body = read_input(body)?;
                respond(&format!("parse_{resource}"), plugin()?.parse(*resource, &body))?
            }
            Command::Notarize { resource, request } => {
                let request = read_input(request)?;
                respond(
                    &format!("notarize_{resource}"),
                    plugin()?.notarize(*resource, &request),
                )?
            }
            Command::Flow { resource } => run_flow(&plugin()?, *resource)?,
        };

        Ok(output)
    }
}

/// start → query → notarize, stopping at the first refusal.
fn run_flow(plugin: &Plugin<&DryRunHost>, resource: ResourceKind) -> Result<Value> {
    let refused = Value::Bool(false);

    if respond("start", plugin.start())? == refused {
        return Ok(refused);
    }

    let request = respond(&format!("query_{resource}"), plugin.query(resource))?;
    if request == refused {
        return Ok(refused);
    }
    info!(target: "plain", "{} request for {resource} built", style("✔").green());

    let handle = respond(
        &format!("notarize_{resource}"),
        plugin.notarize(resource, &request.to_string()),
    )?;
    info!(target: "plain", "{} notarization submitted", style("✔").green());

    Ok(handle)
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read `{}`", path.display()))
}

fn print_session_summary(fixture: &SessionFixture) {
    let kv = |k: &str, v: String| {
        format!(
            "{} {} {}",
            style("✔").green(),
            style(k).bold(),
            style(format!("· {}", v)).dim()
        )
    };

    let tab = fixture.tab_url.clone().unwrap_or_else(|| "none".into());
    info!(target: "plain", "{}", kv("Tab", tab));

    let mut hosts: Vec<&str> = fixture
        .cookies
        .keys()
        .chain(fixture.headers.keys())
        .map(String::as_str)
        .collect();
    hosts.sort_unstable();
    hosts.dedup();

    let hosts = if hosts.is_empty() {
        "none".to_string()
    } else {
        hosts.join(", ")
    };
    info!(target: "plain", "{}", kv("Session hosts", hosts));
}
