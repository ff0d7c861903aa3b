mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use argsync_core::argument::current_set;
use argsync_core::differ::diff_arguments;
use argsync_core::plan::{SyncPlan, Task};
use argsync_core::reconciler::Reconciler;
use argsync_core::store::ParameterStore;
use argsync_scalr::ScalrClient;

use config::SyncConfig;

#[derive(Parser)]
#[command(name = "argsync")]
#[command(about = "Reconcile Scalr provider configuration arguments", long_about = None)]
struct Cli {
    /// Scalr hostname, e.g. acme.scalr.io
    #[arg(long, env = "SCALR_HOSTNAME", global = true)]
    hostname: Option<String>,

    /// Scalr API token
    #[arg(long, env = "SCALR_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show pending argument changes without applying them
    Plan {
        /// Path to the sync configuration file
        #[arg(default_value = "argsync.toml")]
        file: PathBuf,
    },
    /// Apply changes so the remote arguments match the configuration
    Apply {
        /// Path to the sync configuration file
        #[arg(default_value = "argsync.toml")]
        file: PathBuf,

        /// Number of concurrent API calls
        #[arg(long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Plan { ref file } => run_plan(&cli, file).await,
        Commands::Apply { ref file, workers } => run_apply(&cli, file, workers).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn connect(cli: &Cli, config: &SyncConfig) -> Result<ScalrClient, String> {
    let hostname = cli
        .hostname
        .clone()
        .or_else(|| config.hostname.clone())
        .ok_or("no hostname given; use --hostname, SCALR_HOSTNAME or the config file")?;
    let token = cli
        .token
        .clone()
        .ok_or("no API token given; use --token or SCALR_TOKEN")?;

    ScalrClient::new(&hostname, &token).map_err(|e| e.to_string())
}

async fn run_plan(cli: &Cli, file: &PathBuf) -> Result<(), String> {
    let config = SyncConfig::load(file).map_err(|e| e.to_string())?;
    let client = connect(cli, &config)?;
    let config_id = &config.provider_configuration;

    let arguments = client
        .list_parameters(config_id)
        .await
        .map_err(|e| format!("failed to list arguments of {config_id}: {e}"))?;

    let diff = diff_arguments(&config.desired_set(), &current_set(arguments));
    let plan = SyncPlan::from_diff(diff);

    if plan.is_empty() {
        println!("No changes. Arguments are up to date.");
        return Ok(());
    }

    for task in plan.tasks() {
        println!("{}", format_task_brief(task));
    }
    println!("\n{}", plan.summary());

    Ok(())
}

async fn run_apply(cli: &Cli, file: &PathBuf, workers: Option<usize>) -> Result<(), String> {
    let config = SyncConfig::load(file).map_err(|e| e.to_string())?;
    let client = Arc::new(connect(cli, &config)?);
    let config_id = &config.provider_configuration;

    let mut reconciler = Reconciler::new(client);
    if let Some(workers) = workers {
        reconciler = reconciler.with_workers(workers);
    }

    let outcome = reconciler
        .sync(config_id, &config.desired_set())
        .await
        .map_err(|e| e.to_string())?;

    if outcome.is_empty() {
        println!("No changes. Arguments are up to date.");
    } else {
        println!(
            "{} {} created, {} updated, {} deleted.",
            "Apply complete!".green().bold(),
            outcome.created.len(),
            outcome.updated.len(),
            outcome.deleted.len(),
        );
    }

    Ok(())
}

/// Format a task briefly for display
fn format_task_brief(task: &Task) -> String {
    match task {
        Task::Create(spec) => format!("{} {}", "+".green(), spec.key),
        Task::Update(patch) => format!("{} {}", "~".yellow(), patch.key),
        Task::Delete(delete) => format!("{} {}", "-".red(), delete.key),
    }
}
