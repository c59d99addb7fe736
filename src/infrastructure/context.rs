use crate::common::activity::ActivityLog;
use crate::common::result::ProvisionResult;
use crate::domain::entities::provision_config::ProvisionConfig;
use crate::infrastructure::process::{Command, CommandExecutor, CommandOutput, RunMode};
use crate::infrastructure::registry::Registry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Environment variables exported to every spawned command.
///
/// Replaces process-global `setenv` so that each context (and each test)
/// carries its own `SSH_AUTH_SOCK`, `SSH_ASKPASS` and `DISPLAY`.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: Arc<RwLock<BTreeMap<String, String>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.vars
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Everything one provisioning run needs: configuration, registry access,
/// command execution and the state shared between provisioners.
pub struct ProvisionContext {
    config: ProvisionConfig,
    registry: Arc<dyn Registry>,
    executor: CommandExecutor,
    env: Environment,
    pid: u32,
    agent_started: AtomicBool,
    added_keys: Mutex<BTreeSet<PathBuf>>,
}

impl ProvisionContext {
    pub fn new(config: ProvisionConfig, registry: Arc<dyn Registry>, executor: CommandExecutor) -> Self {
        Self {
            config,
            registry,
            executor,
            env: Environment::new(),
            pid: std::process::id(),
            agent_started: AtomicBool::new(false),
            added_keys: Mutex::new(BTreeSet::new()),
        }
    }

    /// Override the process id used to name the agent socket
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }

    pub fn activity(&self) -> &ActivityLog {
        self.executor.activity()
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Run a command with the context environment applied
    pub async fn run(&self, command: Command, mode: RunMode) -> ProvisionResult<CommandOutput> {
        let command = command.with_base_env(self.env.snapshot());
        self.executor.run(&command, mode).await
    }

    pub async fn setting(&self, key: &str) -> ProvisionResult<bool> {
        self.registry.setting_bool(key).await
    }

    pub(crate) fn agent_started(&self) -> bool {
        self.agent_started.load(Ordering::SeqCst)
    }

    pub(crate) fn set_agent_started(&self) {
        self.agent_started.store(true, Ordering::SeqCst);
    }

    /// Whether `ssh-add` and the host scan already succeeded for this key
    pub(crate) fn key_added(&self, key: &Path) -> bool {
        self.added_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }

    pub(crate) fn mark_key_added(&self, key: PathBuf) {
        self.added_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key);
    }
}

impl std::fmt::Debug for ProvisionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionContext")
            .field("config", &self.config)
            .field("env", &self.env)
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}
