//! iamlens CLI - browse the IAM actions a service exposes
//!
//! Usage:
//!   iamlens                        pick a service, resource type and capability
//!   iamlens s3                     pick resource type and capability for s3
//!   iamlens s3 -r object -c IsWrite --json
//!   iamlens s3 --condition-keys
//!   iamlens s3 --resource-details
//!   iamlens s3 --all-resource-details

mod picker;

use clap::{ArgGroup, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iamlens_core::{FilterChoice, LensConfig, Mode, OutputFormat, Session, SessionOptions};
use iamlens_fetch::HttpSource;
use picker::TerminalPicker;

#[derive(Parser, Debug)]
#[command(name = "iamlens")]
#[command(author, version)]
#[command(about = "List the IAM actions a service exposes, filtered by resource type and capability")]
#[command(
    long_about = "List the IAM actions a service exposes, filtered by resource type and capability.\n\n\
    Anything not given on the command line is asked for interactively.\n\
    Pass '*' to --resource or --capability to select everything without a prompt."
)]
#[command(group(ArgGroup::new("mode").args(["condition_keys", "resource_details", "all_resource_details"])))]
struct Cli {
    /// Service name, e.g. s3 (case-insensitive)
    service: Option<String>,

    /// Print JSON instead of plain text
    #[arg(short, long)]
    json: bool,

    /// List the service's condition keys
    #[arg(long)]
    condition_keys: bool,

    /// Show details for one resource type
    #[arg(long)]
    resource_details: bool,

    /// Show details for every resource type
    #[arg(long)]
    all_resource_details: bool,

    /// Resource type to filter on ('*' for all)
    #[arg(short, long, value_name = "NAME")]
    resource: Option<String>,

    /// Capability to filter on, e.g. IsWrite or IsReadOnly ('*' for all)
    #[arg(short, long, value_name = "NAME")]
    capability: Option<String>,

    /// Override the service catalog location
    #[arg(long, value_name = "URL")]
    catalog_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn session_options(&self) -> SessionOptions {
        let mode = if self.condition_keys {
            Mode::ConditionKeys
        } else if self.resource_details {
            Mode::ResourceDetails
        } else if self.all_resource_details {
            Mode::AllResourceDetails
        } else {
            Mode::Actions
        };

        SessionOptions {
            service: self.service.as_deref().map(str::to_lowercase),
            resource: self.resource.as_deref().map(FilterChoice::resource_arg),
            capability: self.capability.as_deref().map(FilterChoice::capability_arg),
            format: OutputFormat::from_json_flag(self.json),
            mode,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the listing
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = LensConfig::load()?;
    if let Some(url) = &cli.catalog_url {
        config = config.with_catalog_url(url.as_str())?;
    }
    tracing::debug!(?config, "configuration loaded");

    let options = cli.session_options();
    let source = HttpSource::new(&config)?;
    let mut picker = TerminalPicker::new();

    let outcome = Session::new(&config, &source, &mut picker)
        .run(&options)
        .await?;

    if !outcome.output.is_empty() {
        println!("{}", outcome.output);
    }
    if let Some(notice) = outcome.notice {
        eprintln!("{}", notice);
    }

    Ok(())
}
