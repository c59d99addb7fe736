use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use crate::application::task_context::{RepositoryTarget, TaskContext};
use crate::application::task_report::TaskReport;
use crate::application::use_cases::{
    BranchRepositoryConfig, BranchRepositoryUseCase, CommitRepositoryConfig,
    CommitRepositoryUseCase, FetchRepositoryConfig, FetchRepositoryUseCase, MavenAction,
    MavenTaskConfig, MavenTaskUseCase,
};
use crate::common::activity::ActivityLog;
use crate::common::result::ProvisionResult;
use crate::domain::entities::identity::IdentityRef;
use crate::infrastructure::filesystem::ConfigStore;
use crate::infrastructure::process::SystemRunner;
use crate::infrastructure::registry::InMemoryRegistry;

/// scm-provision - fetch repositories and provision SCM credentials
#[derive(Parser, Debug)]
#[command(name = "scm-provision")]
#[command(about = "Fetch source repositories and provision SCM, SSH and Maven credentials")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    " for ",
    env!("BUILD_TARGET"),
    ")"
))]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provisioning configuration file (YAML)
    #[arg(long, global = true, env = "SCM_PROVISION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Registry document with identities, proxies, applications and settings (YAML)
    #[arg(long, global = true, env = "SCM_PROVISION_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Home directory override
    #[arg(long, global = true, env = "SCM_PROVISION_HOME")]
    pub home: Option<PathBuf>,

    /// Also write the activity log to this file and attach it to the task
    #[arg(long, global = true)]
    pub log_artifact: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Repository selection shared by the SCM subcommands
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Application owning the repository
    #[arg(short, long = "app")]
    pub application: u64,

    /// Working directory of the checkout
    pub dest: PathBuf,

    /// Identity to try before the application's own (repeatable)
    #[arg(short, long = "identity")]
    pub identities: Vec<u64>,

    /// Branch overriding the repository's
    #[arg(short, long)]
    pub branch: Option<String>,
}

impl TargetArgs {
    fn target(&self) -> RepositoryTarget {
        let target = RepositoryTarget::new(self.application, &self.dest).with_identities(
            self.identities.iter().copied().map(IdentityRef::new).collect(),
        );
        match &self.branch {
            Some(branch) => target.with_branch(branch),
            None => target,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean checkout of the application's repository
    Fetch {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Switch a checkout to a branch, creating it when missing (Git only)
    Branch {
        #[command(flatten)]
        target: TargetArgs,

        /// Branch to switch to
        #[arg(long)]
        name: String,
    },

    /// Stage files, commit and push (Git only)
    Commit {
        #[command(flatten)]
        target: TargetArgs,

        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Files to stage
        #[arg(long = "file")]
        files: Vec<String>,
    },

    /// Run a Maven operation for the application
    Maven {
        /// Application whose artifacts are handled
        #[arg(short, long = "app")]
        application: u64,

        /// Output directory for fetched artifacts
        #[arg(long)]
        bin_dir: PathBuf,

        /// Local repository (defaults to ~/.m2/repository)
        #[arg(long)]
        m2_dir: Option<PathBuf>,

        #[command(subcommand)]
        action: MavenCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum MavenCommand {
    /// Copy the POM's dependencies into the bin directory
    Deps { source: PathBuf },
    /// Fetch the application's binary artifact
    Artifact,
    /// Install the project into the local repository
    Install { source: PathBuf },
    /// Remove the project's artifacts from the local repository
    Delete { source: PathBuf },
    /// Report whether the POM declares modules
    Modules { source: PathBuf },
}

impl MavenCommand {
    fn action(&self) -> MavenAction {
        match self {
            MavenCommand::Deps { source } => MavenAction::FetchDependencies {
                source: source.clone(),
            },
            MavenCommand::Artifact => MavenAction::FetchArtifact,
            MavenCommand::Install { source } => MavenAction::Install {
                source: source.clone(),
            },
            MavenCommand::Delete { source } => MavenAction::Delete {
                source: source.clone(),
            },
            MavenCommand::Modules { source } => MavenAction::HasModules {
                source: source.clone(),
            },
        }
    }
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    pub async fn run(self) -> anyhow::Result<()> {
        colored::control::set_override(!self.cli.no_color);

        let report = match self.task_context() {
            Ok(task) => self.handle_command(&task).await,
            Err(e) => TaskReport::failure(&e, Vec::new()),
        };

        println!("{}", serde_json::to_string_pretty(&report)?);

        if let Some(line) = report.error_line() {
            eprintln!("{} {}", "Error:".red().bold(), line);
            exit(1);
        }
        Ok(())
    }

    fn task_context(&self) -> ProvisionResult<TaskContext> {
        let mut config = ConfigStore::new().load(self.cli.config.as_deref())?;
        if let Some(home) = &self.cli.home {
            config = config.with_home_dir(home);
        }

        let registry = match &self.cli.registry {
            Some(path) => InMemoryRegistry::load(path)?,
            None => InMemoryRegistry::new(),
        };

        let activity = match &self.cli.log_artifact {
            Some(path) => ActivityLog::new().with_artifact(path),
            None => ActivityLog::new(),
        };

        Ok(TaskContext::new(
            config,
            Arc::new(registry),
            Arc::new(SystemRunner::new()),
            activity,
        ))
    }

    async fn handle_command(&self, task: &TaskContext) -> TaskReport {
        if let Err(e) = task.attach_log_artifact().await {
            return task.report::<()>(Err(e));
        }

        match &self.cli.command {
            Commands::Fetch { target } => {
                let use_case = FetchRepositoryUseCase::new(FetchRepositoryConfig::new(target.target()));
                task.report(use_case.execute(task).await)
            }
            Commands::Branch { target, name } => {
                let use_case =
                    BranchRepositoryUseCase::new(BranchRepositoryConfig::new(target.target(), name));
                task.report(use_case.execute(task).await)
            }
            Commands::Commit {
                target,
                message,
                files,
            } => {
                let config = CommitRepositoryConfig::new(target.target(), message)
                    .with_files(files.clone());
                let use_case = CommitRepositoryUseCase::new(config);
                task.report(use_case.execute(task).await)
            }
            Commands::Maven {
                application,
                bin_dir,
                m2_dir,
                action,
            } => {
                let mut config = MavenTaskConfig::new(*application, action.action(), bin_dir);
                if let Some(m2_dir) = m2_dir {
                    config = config.with_m2_dir(m2_dir);
                }
                let use_case = MavenTaskUseCase::new(config);
                task.report(use_case.execute(task).await)
            }
        }
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
