//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands;
use handoff::models::{Stage, Zone};
use handoff::output::OutputMode;

/// handoff - cross-zone task delegation over shared storage
#[derive(Parser, Debug)]
#[command(
    name = "handoff",
    version,
    about = "Delegate tasks between trust zones over shared storage",
    long_about = "Delegate units of work between a low-trust cloud zone and a\n\
                  high-trust local zone over a shared filesystem.\n\n\
                  Tasks are claimed by atomic move, content crossing the boundary\n\
                  is policy-filtered, and sensitive execution waits for a human\n\
                  approval decision."
)]
pub struct Cli {
    /// Vault root directory (defaults to ~/handoff-vault)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a vault (zone stores, queue, approval sets, config)
    Init {
        /// Force re-initialization
        #[arg(short, long)]
        force: bool,
    },

    /// Create, list and inspect task records
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Scan the cloud zone and sync every eligible record to the local zone
    Scan,

    /// Claim a task: atomic ownership transfer with a permanent claim record
    Claim {
        /// Task id
        id: String,

        /// Zone to claim from
        #[arg(long, default_value = "cloud")]
        from_zone: Zone,

        /// Stage to claim from
        #[arg(long, default_value = "pending")]
        from_stage: Stage,

        /// Zone to claim into
        #[arg(long, default_value = "local")]
        to_zone: Zone,

        /// Stage to claim into
        #[arg(long, default_value = "claimed")]
        to_stage: Stage,

        /// Claimant identity recorded in the claim log
        #[arg(long, default_value = "operator")]
        claimant: String,
    },

    /// Sync a single file into the local zone through the policy filter
    Sync {
        /// Path of the file to sync
        file: PathBuf,
    },

    /// Process tasks that arrived in the local zone: classify, gate or execute
    Process {
        /// Process a single task instead of the whole inbox
        id: Option<String>,

        /// Claimant identity recorded in the claim log
        #[arg(long, default_value = "local-processor")]
        claimant: String,
    },

    /// Approve a pending request and execute its task
    Approve {
        /// Request id
        id: String,

        /// Decision rationale
        #[arg(short, long)]
        reason: Option<String>,

        /// Decision actor recorded on the request
        #[arg(long, default_value = "human")]
        actor: String,
    },

    /// Reject a pending request
    Reject {
        /// Request id
        id: String,

        /// Decision rationale
        #[arg(short, long)]
        reason: Option<String>,

        /// Decision actor recorded on the request
        #[arg(long, default_value = "human")]
        actor: String,
    },

    /// List pending approval requests and status-set counts
    Approvals,

    /// Show vault status; optionally write the shared status artifact
    Status {
        /// Write Status.md under the single-writer lock
        #[arg(long)]
        write: bool,
    },

    /// Run health checks with bounded recovery
    Health {
        /// Number of check cycles to run
        #[arg(long, default_value_t = 1)]
        cycles: usize,

        /// Seconds to sleep between cycles
        #[arg(long, default_value_t = 0)]
        interval_secs: u64,
    },

    /// Show version
    Version,
}

/// `task` subcommands
#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// Create a task record
    New {
        /// Task title
        title: String,

        /// Task type classifier
        #[arg(short = 't', long, default_value = "user-request")]
        task_type: String,

        /// Priority: low, medium, high, critical
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Where the task came from
        #[arg(short, long, default_value = "cli")]
        source: String,

        /// Task body
        #[arg(short, long, default_value = "")]
        body: String,

        /// Zone to create in
        #[arg(long, default_value = "cloud")]
        zone: Zone,

        /// Stage to create in
        #[arg(long, default_value = "pending")]
        stage: Stage,
    },

    /// List task records in one stage
    List {
        /// Zone to list
        #[arg(long, default_value = "cloud")]
        zone: Zone,

        /// Stage to list
        #[arg(long, default_value = "pending")]
        stage: Stage,
    },

    /// Print a task record
    Show {
        /// Task id
        id: String,

        /// Zone to look in
        #[arg(long, default_value = "cloud")]
        zone: Zone,

        /// Stage to look in
        #[arg(long, default_value = "pending")]
        stage: Stage,
    },
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let root = cli.root.clone().unwrap_or_else(|| {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join("handoff-vault")
    });

    match cli.command {
        Some(Command::Init { force }) => commands::init(&root, force, output_mode),
        Some(Command::Task { action }) => commands::task(&root, action, output_mode),
        Some(Command::Scan) => commands::scan(&root, output_mode),
        Some(Command::Claim {
            id,
            from_zone,
            from_stage,
            to_zone,
            to_stage,
            claimant,
        }) => commands::claim(
            &root, &id, from_zone, from_stage, to_zone, to_stage, &claimant, output_mode,
        ),
        Some(Command::Sync { file }) => commands::sync(&root, &file, output_mode),
        Some(Command::Process { id, claimant }) => {
            commands::process(&root, id.as_deref(), &claimant, output_mode)
        },
        Some(Command::Approve { id, reason, actor }) => commands::decide(
            &root,
            &id,
            handoff::approval::Decision::Approved,
            reason.as_deref(),
            &actor,
            output_mode,
        ),
        Some(Command::Reject { id, reason, actor }) => commands::decide(
            &root,
            &id,
            handoff::approval::Decision::Rejected,
            reason.as_deref(),
            &actor,
            output_mode,
        ),
        Some(Command::Approvals) => commands::approvals(&root, output_mode),
        Some(Command::Status { write }) => commands::status(&root, write, output_mode),
        Some(Command::Health {
            cycles,
            interval_secs,
        }) => commands::health(&root, cycles, interval_secs, output_mode),
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION")
                    })
                );
            } else {
                println!("handoff v{}", env!("CARGO_PKG_VERSION"));
            }
            Ok(())
        },
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("handoff v{}", env!("CARGO_PKG_VERSION"));
                println!("\nRun 'handoff --help' for usage");
                println!("Run 'handoff init' to create a vault");
            }
            Ok(())
        },
    }
}
