use clap::ValueHint;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use x_profile_plugin::ResourceKind;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Recorded browser session (tab url, cookies and headers per hostname)
    #[arg(
        long,
        short,
        env = "X_PROFILE_SESSION",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub(crate) session: Option<PathBuf>,

    /// Replace the tab url of the session
    #[arg(long, env = "X_PROFILE_TAB_URL", value_hint = ValueHint::Url, global = true)]
    pub(crate) tab_url: Option<String>,

    #[command(subcommand)]
    pub(crate) cmd: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Print the plugin manifest
    Manifest,

    /// Check that the session's tab is on an allowed host
    Start,

    /// Build the request descriptor for a resource (account | tweet)
    Query {
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,
    },

    /// Compute the revealed parts of a saved response body
    Parse {
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,

        #[arg(value_hint = ValueHint::FilePath)]
        body: PathBuf,
    },

    /// Submit a saved request descriptor to the dry-run notary
    Notarize {
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,

        #[arg(value_hint = ValueHint::FilePath)]
        request: PathBuf,
    },

    /// Run start, query and notarize in sequence
    Flow {
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,
    },
}

fn parse_resource(s: &str) -> Result<ResourceKind, String> {
    ResourceKind::from_str(s).map_err(|_| format!("unknown resource `{s}` (account | tweet)"))
}
