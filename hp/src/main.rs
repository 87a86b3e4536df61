//! htp - hierarchical task-plan solver
//!
//! CLI entry point: decompose a problem into a plan, execute it, report
//! the answer.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use htplan::cli::{Cli, Command, OutputFormat};
use htplan::config::Config;
use htplan::domain::{FileResource, Htp, Resource, ResourceSet};
use htplan::exec::{CancelFlag, ExecContext};
use htplan::planner::AutoPlanner;
use htplan::prompts::PromptLoader;
use htplan::reasoner::LmReasoner;
use lmclient::{LmClient, create_client};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    // Logs go to stderr so stdout stays clean for plan/answer output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    debug!(model = %config.llm.model, "main: config loaded");

    match cli.command {
        Command::Plan {
            problem,
            max_depth,
            max_subtasks,
            resource,
            format,
        } => cmd_plan(&config, &problem, max_depth, max_subtasks, &resource, format).await,
        Command::Solve {
            problem,
            max_depth,
            max_subtasks,
            resource,
            show_plan,
        } => cmd_solve(&config, &problem, max_depth, max_subtasks, &resource, show_plan).await,
        Command::Exec {
            plan,
            resource,
            show_plan,
        } => cmd_exec(&config, &plan, &resource, show_plan).await,
    }
}

/// Build the LM client, prompt loader, and planner from config + flag overrides
fn build_planner(
    config: &Config,
    max_depth: Option<u32>,
    max_subtasks: Option<u32>,
) -> Result<(Arc<dyn LmClient>, Arc<PromptLoader>, AutoPlanner)> {
    config.validate()?;
    let lm = create_client(&config.llm)?;
    let prompts = Arc::new(PromptLoader::new(config.prompts.dir.clone()));

    let mut planner_config = config.planner.clone();
    if let Some(depth) = max_depth {
        planner_config.max_depth = depth;
    }
    if let Some(subtasks) = max_subtasks {
        planner_config.max_subtasks_per_decomp = subtasks;
    }

    let planner = AutoPlanner::new(Arc::clone(&lm), Arc::clone(&prompts), planner_config, config.retry.clone());
    Ok((lm, prompts, planner))
}

/// Load resource files into a shared set
fn load_resources(paths: &[PathBuf]) -> Result<ResourceSet> {
    let resources: Vec<Arc<dyn Resource>> = paths
        .iter()
        .map(|path| FileResource::load(path).map(|r| Arc::new(r) as Arc<dyn Resource>))
        .collect::<Result<_>>()?;
    Ok(ResourceSet::new(resources))
}

/// Execute a plan tree with ctrl-c wired to the cancellation flag
async fn run_plan(
    htp: &mut Htp,
    lm: &Arc<dyn LmClient>,
    prompts: &Arc<PromptLoader>,
    config: &Config,
) -> Result<String> {
    let reasoner = LmReasoner::new(Arc::clone(lm), Arc::clone(prompts)).with_max_tokens(config.llm.max_tokens);

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current task");
                cancel.cancel();
            }
        });
    }

    let ctx = ExecContext::new(&reasoner, lm.as_ref(), prompts.as_ref())
        .with_cancel(cancel)
        .with_max_tokens(config.llm.max_tokens);

    let answer = htp.execute(&ctx, &[]).await?;
    Ok(answer)
}

async fn cmd_plan(
    config: &Config,
    problem: &str,
    max_depth: Option<u32>,
    max_subtasks: Option<u32>,
    resource_paths: &[PathBuf],
    format: OutputFormat,
) -> Result<()> {
    let (_, _, planner) = build_planner(config, max_depth, max_subtasks)?;
    let resources = load_resources(resource_paths)?;

    let htp = planner.plan(problem, &resources).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&htp.to_record())?),
        OutputFormat::Text => print!("{}", htp),
    }
    Ok(())
}

async fn cmd_solve(
    config: &Config,
    problem: &str,
    max_depth: Option<u32>,
    max_subtasks: Option<u32>,
    resource_paths: &[PathBuf],
    show_plan: bool,
) -> Result<()> {
    let (lm, prompts, planner) = build_planner(config, max_depth, max_subtasks)?;
    let resources = load_resources(resource_paths)?;

    let mut htp = planner.plan(problem, &resources).await?;
    info!(nodes = htp.node_count(), "solve: executing plan");

    let answer = run_plan(&mut htp, &lm, &prompts, config).await?;

    println!("{}", answer);
    if show_plan {
        eprintln!("\n{}", htp);
    }
    Ok(())
}

async fn cmd_exec(config: &Config, plan_path: &PathBuf, resource_paths: &[PathBuf], show_plan: bool) -> Result<()> {
    let (lm, prompts, _) = build_planner(config, None, None)?;

    let content = std::fs::read_to_string(plan_path)
        .with_context(|| format!("Failed to read plan file {}", plan_path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content).context("Plan file is not valid JSON")?;
    let mut htp = Htp::from_value(&value)?;

    let resources = load_resources(resource_paths)?;
    if !resources.is_empty() {
        htp.task.resources = resources;
        htp.fix_missing_resources();
    }

    let answer = run_plan(&mut htp, &lm, &prompts, config).await?;

    println!("{}", answer);
    if show_plan {
        eprintln!("\n{}", htp);
    }
    Ok(())
}
