//! CLI command definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// htp - hierarchical task-plan solver
#[derive(Parser)]
#[command(
    name = "htp",
    about = "Decompose a problem into sub-questions, resolve them bottom-up, synthesize an answer",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a task plan for a problem without executing it
    Plan {
        /// The problem to decompose
        problem: String,

        /// Maximum decomposition depth to request
        #[arg(long)]
        max_depth: Option<u32>,

        /// Maximum sub-tasks to request per decomposition step
        #[arg(long)]
        max_subtasks: Option<u32>,

        /// Resource file(s) to ground the plan in (repeatable)
        #[arg(short, long)]
        resource: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Generate a plan and execute it to a final answer
    Solve {
        /// The problem to solve
        problem: String,

        /// Maximum decomposition depth to request
        #[arg(long)]
        max_depth: Option<u32>,

        /// Maximum sub-tasks to request per decomposition step
        #[arg(long)]
        max_subtasks: Option<u32>,

        /// Resource file(s) to ground the reasoning in (repeatable)
        #[arg(short, long)]
        resource: Vec<PathBuf>,

        /// Print the resolved plan tree after the answer
        #[arg(long)]
        show_plan: bool,
    },

    /// Execute an existing plan file (structured JSON)
    Exec {
        /// Path to the plan JSON file
        plan: PathBuf,

        /// Resource file(s) to ground the reasoning in (repeatable)
        #[arg(short, long)]
        resource: Vec<PathBuf>,

        /// Print the resolved plan tree after the answer
        #[arg(long)]
        show_plan: bool,
    },
}

/// Output format for plan printing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented tree with status markers
    Text,
    /// Structured-plan JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_command() {
        let cli = Cli::parse_from(["htp", "plan", "Why is churn up?", "--max-depth", "3", "-r", "notes.md"]);
        match cli.command {
            Command::Plan {
                problem,
                max_depth,
                resource,
                format,
                ..
            } => {
                assert_eq!(problem, "Why is churn up?");
                assert_eq!(max_depth, Some(3));
                assert_eq!(resource, vec![PathBuf::from("notes.md")]);
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_solve_command() {
        let cli = Cli::parse_from(["htp", "solve", "Why is churn up?", "--show-plan"]);
        match cli.command {
            Command::Solve { problem, show_plan, .. } => {
                assert_eq!(problem, "Why is churn up?");
                assert!(show_plan);
            }
            _ => panic!("Expected Solve command"),
        }
    }

    #[test]
    fn test_exec_command() {
        let cli = Cli::parse_from(["htp", "exec", "plan.json"]);
        match cli.command {
            Command::Exec { plan, .. } => assert_eq!(plan, PathBuf::from("plan.json")),
            _ => panic!("Expected Exec command"),
        }
    }
}
