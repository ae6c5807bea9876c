use anyhow::{Context, Result};
use dialoguer::console::style;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use x_profile_cli::Application;

fn main() -> Result<()> {
    init_logging().context("initializing logging")?;

    print_welcome();

    Application::init()?.run()
}

fn init_logging() -> anyhow::Result<()> {
    // stdout carries the operation output; everything else goes to stderr
    let plain_fmt = tracing_subscriber::fmt::format()
        .without_time()
        .with_level(false)
        .with_target(false)
        .compact();
    let plain_layer = tracing_subscriber::fmt::layer()
        .event_format(plain_fmt)
        .with_writer(std::io::stderr)
        .with_filter(Targets::new().with_target("plain", LevelFilter::TRACE));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,x_profile_plugin=info,x_profile_cli=info"));

    let rich_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(plain_layer)
        .with(rich_layer)
        .try_init()?;

    Ok(())
}

fn print_welcome() {
    let sep = style("◆").blue().bold();
    let title = style("X profile plugin").bold();
    let subtitle = style("Dry-run the notarization plugin against a recorded session.").dim();

    info!(target: "plain", "\n{sep} {title} {sep}\n{subtitle}\n");
}
