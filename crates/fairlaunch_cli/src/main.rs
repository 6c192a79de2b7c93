use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fairlaunch_chain::{
    AccountSource, DeploymentPlan, FairLaunchModule, NetworkRegistry, PlanExporter, declare, run,
};
use fairlaunch_core::{CONFIG_FILE_NAME, LaunchConfig, LaunchError, logging};
use tracing::{error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "fairlaunch", version, about = "Plan FairLaunchToken deployments on Base")]
struct Cli {
    /// Project config file.
    #[arg(long, short, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Directory for log files (defaults to ~/.fairlaunch/logs).
    #[arg(long, env = "FAIRLAUNCH_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Log level, overrides the config file. `RUST_LOG` wins over both.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a default config file.
    Init {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
    /// List configured networks.
    Networks,
    /// Show the connection parameters of one network.
    Resolve { network: String },
    /// Print the deployment plan for a network as JSON.
    Plan {
        #[command(flatten)]
        target: Target,
    },
    /// Write the deployment plan where the deployment engine picks it up.
    Export {
        #[command(flatten)]
        target: Target,

        /// Output directory (defaults to `deployments_dir` from the config).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Args)]
struct Target {
    /// Network identifier (defaults to `default_network` from the config).
    #[arg(long, short)]
    network: Option<String>,

    /// Hardhat artifacts directory.
    #[arg(long, conflicts_with = "no_artifacts")]
    artifacts: Option<PathBuf>,

    /// Plan without bytecode even if artifacts exist.
    #[arg(long)]
    no_artifacts: bool,
}

impl Target {
    /// The artifacts directory to plan with, if any. An explicit directory
    /// must exist; the configured one is used only when present.
    fn artifacts_dir(&self, config: &LaunchConfig) -> Result<Option<PathBuf>> {
        if self.no_artifacts {
            return Ok(None);
        }
        match &self.artifacts {
            Some(dir) if !dir.is_dir() => bail!("artifacts directory {} not found", dir.display()),
            Some(dir) => Ok(Some(dir.clone())),
            None if config.artifacts_dir.is_dir() => Ok(Some(config.artifacts_dir.clone())),
            None => Ok(None),
        }
    }

    fn network<'a>(&'a self, config: &'a LaunchConfig) -> &'a str {
        self.network.as_deref().unwrap_or(&config.default_network)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run_cli(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {}", describe(&e));
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run_cli(cli: Cli) -> Result<()> {
    if let Command::Init { force } = cli.command {
        return init_config(&cli.config, force);
    }

    let config = LaunchConfig::load_from_path(&cli.config)?;
    let logs_dir = match cli.log_dir {
        Some(dir) => dir,
        None => LaunchConfig::logs_dir()?,
    };
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let _log_guard = logging::init_logging(&logs_dir, level)?;
    info!("Starting fairlaunch v{VERSION}");

    // The credential is required before anything touches a network.
    let accounts = AccountSource::from_env(&config.mnemonic_env)?;
    let mut registry = NetworkRegistry::with_defaults(accounts.clone());
    registry.apply_overrides(&config.networks)?;

    match cli.command {
        // Handled before the credential is loaded.
        Command::Init { .. } => {}
        Command::Networks => print_networks(&registry),
        Command::Resolve { network } => {
            let profile = registry.resolve(&network)?;
            let view = serde_json::json!({
                "network": profile.summary(),
                "accounts": profile.accounts.summary(),
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Plan { target } => {
            let plan = build_plan(&registry, &config, &target)?;
            println!("{}", plan.to_json_pretty()?);
        }
        Command::Export { target, out } => {
            let plan = build_plan(&registry, &config, &target)?;
            let out_dir = out.unwrap_or_else(|| config.deployments_dir.clone());
            let exporter = PlanExporter::new(out_dir, config.compiler.clone());
            let submission = run(&exporter, &plan, &accounts).await?;
            println!("{}", submission.location);
        }
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    LaunchConfig::default()
        .save_to_path(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn print_networks(registry: &NetworkRegistry) {
    println!("{:<16} {:<32} {:>14}", "NETWORK", "RPC URL", "GAS PRICE");
    for profile in registry.profiles() {
        let marker = if profile.is_custom { " *" } else { "" };
        println!(
            "{:<16} {:<32} {:>14}{marker}",
            profile.identifier, profile.rpc_url, profile.gas_price_wei
        );
    }
}

fn build_plan(
    registry: &NetworkRegistry,
    config: &LaunchConfig,
    target: &Target,
) -> Result<DeploymentPlan> {
    let profile = registry.resolve(target.network(config))?;
    let artifacts = target.artifacts_dir(config)?;
    let declaration = declare(&FairLaunchModule::new())?;
    let plan = DeploymentPlan::new(&declaration, profile, artifacts.as_deref())?;
    Ok(plan)
}

fn launch_error(e: &anyhow::Error) -> Option<&LaunchError> {
    e.chain().find_map(|cause| cause.downcast_ref::<LaunchError>())
}

fn exit_code(e: &anyhow::Error) -> u8 {
    launch_error(e).map_or(1, |le| le.exit_code() as u8)
}

fn describe(e: &anyhow::Error) -> String {
    match launch_error(e) {
        Some(le) => le.user_message(),
        None => format!("{e:#}"),
    }
}
