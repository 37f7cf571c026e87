use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use pdns_zone_manager::{
    ApplyOptions, Config, Confirm, Manager, PowerDnsClient,
    config::account_name_from_env,
    logging::{LogOptions, init_tracing},
    report::{Summary, mask_secret},
};
use tokio::signal;
use tracing::{debug, error, info, warn};

/// Manage PowerDNS zones and records.
///
/// Creates absent zones and manages record sets marked with this tool's
/// account name in their comments. Record sets without a matching comment are
/// never modified. The account defaults to `zone-manager` and can be changed
/// with the ACCOUNT_NAME environment variable.
#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// PowerDNS API base URL (e.g. http://127.0.0.1:8081/api/v1)
    #[arg(long, value_name = "URL", env = "PDNS_API_URL", global = true)]
    api_url: Option<String>,
    /// PowerDNS API key
    #[arg(long, value_name = "KEY", env = "PDNS_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// PowerDNS server ID
    #[arg(long, value_name = "ID", default_value = "localhost", global = true)]
    server_id: String,
    /// Enable verbose/debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Output in JSON format (structured logging)
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply zone configuration from a YAML file
    Apply {
        /// Path to the zone configuration
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
        /// Show what would be changed without applying
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        auto_confirm: bool,
    },
}

/// Interactive `[y/N]` prompt on the terminal.
///
/// Stdin is read on the blocking pool so Ctrl-C stays observable while the
/// prompt is waiting.
struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            print!("{prompt} [y/N]: ");
            std::io::stdout().flush()?;
            let mut answer = String::new();
            std::io::stdin().lock().read_line(&mut answer)?;
            Ok(answer)
        })
        .await;

        match answer {
            Ok(Ok(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(Err(err)) => {
                warn!("failed to read confirmation: {err}");
                false
            }
            Err(err) => {
                warn!("confirmation prompt failed: {err}");
                false
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(LogOptions {
        verbose: cli.verbose,
        json: cli.json,
        no_color: cli.no_color,
    });

    match &cli.command {
        Command::Apply {
            config,
            dry_run,
            auto_confirm,
        } => run_apply(&cli, config, *dry_run, *auto_confirm).await,
    }
}

async fn run_apply(
    cli: &Cli,
    config_path: &Path,
    dry_run: bool,
    auto_confirm: bool,
) -> Result<()> {
    let api_url = cli
        .api_url
        .as_deref()
        .context("--api-url (or PDNS_API_URL) is required")?;
    let api_key = cli
        .api_key
        .as_deref()
        .context("--api-key (or PDNS_API_KEY) is required")?;
    let account_name = account_name_from_env();

    info!("Loading configuration from {}", config_path.display());
    debug!("API URL: {api_url}");
    debug!("API Key: {}", mask_secret(api_key));
    debug!("Account name: {account_name}");

    let config = Config::load_from_file(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    info!("Loaded {} zone(s) from configuration", config.zones.len());

    let client = PowerDnsClient::new(api_url, api_key, &cli.server_id);
    let mut manager = Manager::new(client, account_name);
    if !cli.json && !auto_confirm && !dry_run {
        manager = manager.with_confirm(StdinConfirm);
    }

    let opts = ApplyOptions {
        dry_run,
        auto_confirm: cli.json || auto_confirm,
    };

    info!("Applying configuration...");
    let result = tokio::select! {
        res = manager.apply(&config, opts) => res.context("failed to apply configuration")?,
        _ = shutdown_signal() => {
            // A pending prompt's blocking read would hold up runtime shutdown.
            error!("interrupted; remaining zones were not processed");
            std::process::exit(130);
        }
    };

    let summary = Summary::new(&result, dry_run);
    if cli.json {
        println!("{}", summary.to_json()?);
    } else {
        println!("\n{}", summary.render_text());
        if let Some(errors) = summary.render_errors() {
            eprintln!("\n{errors}");
        }
    }

    if result.was_aborted() {
        warn!("one or more zones were not changed because confirmation was declined");
    }
    if result.has_errors() {
        bail!("apply completed with {} error(s)", result.errors.len());
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to install CTRL+C handler: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
