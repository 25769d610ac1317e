mod display;

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use dossier_core::output::{get_formatter, OutputFormat};
use dossier_core::{DomainResolver, LookupConfig};
use tracing_subscriber::EnvFilter;

use display::Spinner;

#[derive(Parser)]
#[command(name = "dossier")]
#[command(about = "Domain registration lookup - races RDAP and WHOIS, then checks live DNS")]
#[command(version)]
struct Cli {
    /// Domain name or URL to look up
    domain: String,

    /// Output format (human or json)
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,

    /// Seconds to wait for the first registration source to answer
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Upstream DNS server for A/MX/TXT lookups (defaults to Google DNS)
    #[arg(long)]
    dns_server: Option<IpAddr>,

    /// JSON file with lookup settings; flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let deadline = config.deadline;
    let resolver = DomainResolver::with_config(config);

    let result = {
        let _spinner = (cli.format == OutputFormat::Human)
            .then(|| Spinner::resolving(&cli.domain, deadline));
        resolver.resolve(&cli.domain).await
    };

    match result {
        Ok(record) => {
            let formatter = get_formatter(cli.format);
            println!("{}", formatter.format_record(&record, chrono::Utc::now()));
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".bright_red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<LookupConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid config in {}", path.display()))?
        }
        None => LookupConfig::default(),
    };

    if let Some(secs) = cli.deadline_secs {
        config = config.with_deadline(Duration::from_secs(secs));
    }
    if let Some(server) = cli.dns_server {
        config = config.with_nameserver(server);
    }
    Ok(config)
}
