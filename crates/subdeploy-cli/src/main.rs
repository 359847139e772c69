//! Subdeploy - subgraph build & deploy orchestrator
//!
//! Usage:
//!   subdeploy codegen                      # Generate subgraph code
//!   subdeploy build <network>              # Prepare and build for a network
//!   subdeploy deploy <network> [--label]   # Deploy one network
//!   subdeploy deploy-all [--label]         # Codegen, build and deploy every network
//!   subdeploy networks                     # List deployable networks

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subdeploy_core::config::CommandFailurePolicy;
use subdeploy_core::context::AppContext;
use subdeploy_core::deploy::{
    BuildReport, DeployReport, FleetPolicy, FleetReport, Orchestrator, StepReport,
};
use subdeploy_core::runner::{CommandRunner, DryRunRunner, ShellRunner};
use subdeploy_core::target::DeploymentTarget;
use subdeploy_core::types::NetworkId;

type DynOrchestrator = Orchestrator<Box<dyn CommandRunner>>;

#[derive(Parser)]
#[command(name = "subdeploy")]
#[command(about = "Build and deploy per-network subgraphs", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Project directory containing the subgraph (defaults to the current directory)
    #[arg(long, short = 'C', global = true)]
    project_dir: Option<PathBuf>,

    /// Network registry JSON file (default: <project>/networks.json)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Configuration file (default: <project>/subdeploy.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print commands instead of running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log failed commands and keep going instead of stopping
    #[arg(long, global = true)]
    continue_on_error: bool,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate subgraph code
    Codegen,

    /// Prepare and build the subgraph for a network
    Build {
        /// Network identifier from the registry
        network: String,
    },

    /// Deploy a network's subgraph
    Deploy {
        /// Network identifier from the registry
        network: String,

        /// Version label (hosted-service only; studio versions are auto-incremented)
        #[arg(long, short)]
        label: Option<String>,
    },

    /// Codegen, build and deploy every deployable network in registry order
    DeployAll {
        /// Version label (hosted-service only; studio versions are auto-incremented)
        #[arg(long, short)]
        label: Option<String>,

        /// Only deploy these networks
        #[arg(long = "only", value_name = "NETWORK")]
        only: Vec<String>,

        /// Skip these networks in addition to the configured exclusions
        #[arg(long = "skip", value_name = "NETWORK")]
        skip: Vec<String>,
    },

    /// List deployable networks and their deployment targets
    #[command(alias = "ls")]
    Networks,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "subdeploy=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run_cli(cli)
}

fn run_cli(cli: Cli) -> Result<()> {
    let needs_registry = !matches!(cli.command, Commands::Codegen);
    let orch = build_orchestrator(&cli.global, needs_registry)?;
    let format = cli.global.format;

    match cli.command {
        Commands::Codegen => {
            let report = orch.run_codegen()?;
            print_step("codegen", &report, format)?;
        }
        Commands::Build { network } => {
            let network = deployable_network(&orch, &network)?;
            let report = orch.run_build(&network)?;
            print_build(&report, format)?;
        }
        Commands::Deploy { network, label } => {
            let network = deployable_network(&orch, &network)?;
            let report = orch.run_deploy(&network, label.as_deref())?;
            print_deploy(&report, format)?;
        }
        Commands::DeployAll { label, only, skip } => {
            let policy = FleetPolicy::from_config(&orch.config().fleet)
                .with_only(if only.is_empty() { None } else { Some(only) })
                .with_skip(skip);
            let report = orch.run_fleet_deploy_with(&policy, label.as_deref())?;
            print_fleet(&report, format)?;
        }
        Commands::Networks => {
            print_networks(&orch, format)?;
        }
    }
    Ok(())
}

fn build_orchestrator(args: &GlobalArgs, needs_registry: bool) -> Result<DynOrchestrator> {
    let mut ctx = match &args.project_dir {
        Some(dir) => AppContext::new(dir.clone()),
        None => AppContext::with_defaults()?,
    };
    if let Some(path) = &args.registry {
        ctx = ctx.with_registry_path(path.clone());
    }
    if let Some(path) = &args.config {
        ctx = ctx.with_config_path(path.clone());
    }

    tracing::debug!(
        project = %ctx.project_root().display(),
        registry = %ctx.registry_path().display(),
        dry_run = args.dry_run,
        "Preparing orchestrator"
    );

    let runner: Box<dyn CommandRunner> = if args.dry_run {
        Box::new(DryRunRunner::new())
    } else {
        Box::new(ShellRunner::in_dir(ctx.project_root().to_path_buf()))
    };

    let mut orch = if needs_registry {
        ctx.orchestrator(runner)?
    } else {
        ctx.codegen_orchestrator(runner)?
    };
    if args.continue_on_error {
        orch = orch.with_failure_policy(CommandFailurePolicy::Continue);
    }
    Ok(orch)
}

/// Reject networks the fleet configuration excludes from deployment.
fn deployable_network(orch: &DynOrchestrator, network: &str) -> Result<NetworkId> {
    let policy = FleetPolicy::from_config(&orch.config().fleet);
    if policy.excluded().iter().any(|n| n == network) {
        anyhow::bail!(
            "Network '{}' is excluded from deployment (excluded: {})",
            network,
            policy.excluded().join(", ")
        );
    }
    Ok(NetworkId::from(network))
}

// =============================================================================
// Output
// =============================================================================

fn print_commands(step: &StepReport) {
    for record in &step.commands {
        let symbol = if record.succeeded { "✓" } else { "✗" };
        println!("  {} {}", symbol, record.command);
    }
    for warning in &step.warnings {
        println!("  ⚠ {}", warning);
    }
}

fn print_step(name: &str, report: &StepReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}:", name);
            print_commands(report);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn print_build(report: &BuildReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("Built {} (build target: {})", report.network, report.build_target);
            print_commands(&report.step);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn print_deploy(report: &DeployReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print_deploy_line(report);
            print_commands(&report.step);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn print_deploy_line(report: &DeployReport) {
    let label = report
        .version_label
        .as_deref()
        .map(|l| format!(" ({})", l))
        .unwrap_or_default();
    println!(
        "Deployed {} -> {} {}{}",
        report.network,
        report.target.kind(),
        report.target.subgraph_name(),
        label
    );
}

fn print_fleet(report: &FleetReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for network in &report.networks {
                print_deploy_line(&network.deploy);
                for warning in report_warnings(network) {
                    println!("  ⚠ {}", warning);
                }
            }
            println!(
                "Summary: {} networks deployed in {}s",
                report.networks.len(),
                (report.finished_at - report.started_at).num_seconds()
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn report_warnings(network: &subdeploy_core::deploy::NetworkReport) -> Vec<&str> {
    network
        .codegen
        .warnings
        .iter()
        .chain(&network.build.step.warnings)
        .chain(&network.deploy.step.warnings)
        .map(String::as_str)
        .collect()
}

fn print_networks(orch: &DynOrchestrator, format: OutputFormat) -> Result<()> {
    let plan = orch.fleet_plan();
    let rows: Vec<(NetworkId, Result<DeploymentTarget, String>)> = plan
        .networks()
        .iter()
        .map(|id| {
            let target = orch.resolve_target(id).map_err(|e| e.to_string());
            (id.clone(), target)
        })
        .collect();

    match format {
        OutputFormat::Table => {
            println!(
                "  {:<15} {:<15} {:<35} Version",
                "Network", "Target", "Subgraph"
            );
            println!("  {}", "-".repeat(80));
            for (id, target) in &rows {
                match target {
                    Ok(DeploymentTarget::Hosted { subgraph_name }) => println!(
                        "  {:<15} {:<15} {:<35} -",
                        truncate(id.as_str(), 15),
                        "hosted-service",
                        truncate(subgraph_name, 35)
                    ),
                    Ok(DeploymentTarget::Studio {
                        subgraph_name,
                        current_version,
                    }) => println!(
                        "  {:<15} {:<15} {:<35} {}",
                        truncate(id.as_str(), 15),
                        "studio",
                        truncate(subgraph_name, 35),
                        current_version
                    ),
                    Err(err) => println!("  {:<15} [Error] {}", truncate(id.as_str(), 15), err),
                }
            }
            let excluded = FleetPolicy::from_config(&orch.config().fleet);
            println!();
            println!("Excluded: {}", excluded.excluded().join(", "));
        }
        OutputFormat::Json => {
            let networks: Vec<serde_json::Value> = rows
                .iter()
                .map(|(id, target)| match target {
                    Ok(target) => serde_json::json!({ "network": id, "target": target }),
                    Err(err) => serde_json::json!({ "network": id, "error": err }),
                })
                .collect();
            let output = serde_json::json!({
                "schema_version": 1,
                "networks": networks,
                "excluded": orch.config().fleet.exclude,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
