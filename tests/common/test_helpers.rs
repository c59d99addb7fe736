//! Test helper functions and utilities
//!
//! `Sandbox` roots every provisioned path in a temporary directory and
//! answers external commands from a `ScriptedRunner`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use scm_provision::application::TaskContext;
use scm_provision::common::activity::ActivityLog;
use scm_provision::domain::entities::provision_config::ProvisionConfig;
use scm_provision::infrastructure::context::ProvisionContext;
use scm_provision::infrastructure::process::{CommandExecutor, ScriptedRunner};
use scm_provision::infrastructure::registry::{InMemoryRegistry, Registry};

pub const TEST_PID: u32 = 4242;

/// Temporary home, tmp and work directories plus a scripted runner
pub struct Sandbox {
    root: TempDir,
    pub config: ProvisionConfig,
    pub runner: ScriptedRunner,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let config = ProvisionConfig::rooted_at(root.path());
        Self {
            root,
            config,
            runner: ScriptedRunner::new(),
        }
    }

    pub fn with_runner(mut self, runner: ScriptedRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn home(&self) -> PathBuf {
        self.config.home_dir.clone()
    }

    /// Checkout directory inside the sandbox
    pub fn dest(&self) -> PathBuf {
        self.root.path().join("work").join("src")
    }

    /// Fresh provisioning context over `registry`
    pub fn context(&self, registry: &InMemoryRegistry) -> Arc<ProvisionContext> {
        let executor = CommandExecutor::new(Arc::new(self.runner.clone()), ActivityLog::new());
        let registry: Arc<dyn Registry> = Arc::new(registry.clone());
        Arc::new(ProvisionContext::new(self.config.clone(), registry, executor).with_pid(TEST_PID))
    }

    pub fn task(&self, registry: &InMemoryRegistry) -> TaskContext {
        let registry_arc: Arc<dyn Registry> = Arc::new(registry.clone());
        TaskContext::from_provision(self.context(registry), registry_arc)
    }

    /// Read a file that must exist
    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    /// Create a file (and its parents) with the given content
    pub fn write(&self, path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}
