use anyhow::Result;
use clap::{Parser, Subcommand};
use runtime::{AppConfig, CliArgs};
use site_auth::config::MODULE_NAME;
use site_auth::SiteAuthConfig;
use std::path::{Path, PathBuf};

mod demo;
mod presenter;

/// DYNAMIC.ORG site - auth and session layer, runnable against an in-memory backend
#[derive(Parser)]
#[command(name = "dynamic-org-site")]
#[command(about = "DYNAMIC.ORG site - auth and session layer")]
#[command(version = "0.1.0")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration, including the site_auth section
    Check,
    /// Walk through every site flow against the in-memory backend
    Demo,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        verbose: cli.verbose,
    };

    let mut app = AppConfig::load_or_default(cli.config.as_deref())?;
    app.apply_cli_overrides(&args);

    runtime::init_logging_from_config(&app.logging_or_default(), Path::new(&app.home_dir));
    tracing::info!("dynamic-org-site starting");

    if cli.print_config {
        print!("{}", app.to_yaml()?);
        return Ok(());
    }

    let site_auth = SiteAuthConfig::from_module_value(app.module_config(MODULE_NAME))?;

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_config(&app, &site_auth),
        Commands::Demo => demo::run(site_auth).await,
    }
}

fn check_config(app: &AppConfig, site_auth: &SiteAuthConfig) -> Result<()> {
    tracing::info!(home_dir = %app.home_dir, "configuration is valid");
    println!("Configuration check passed");
    println!("{MODULE_NAME}:");
    println!("{}", serde_json::to_string_pretty(site_auth)?);
    Ok(())
}
