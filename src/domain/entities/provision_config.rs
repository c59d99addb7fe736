use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Paths of the external programs driven by the provisioners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Programs {
    #[validate(length(min = 1))]
    pub git: String,

    #[validate(length(min = 1))]
    pub svn: String,

    #[validate(length(min = 1))]
    pub mvn: String,

    #[validate(length(min = 1))]
    pub ssh_agent: String,

    #[validate(length(min = 1))]
    pub ssh_add: String,

    #[validate(length(min = 1))]
    pub ssh_keyscan: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            git: "/usr/bin/git".to_string(),
            svn: "/usr/bin/svn".to_string(),
            mvn: "/usr/bin/mvn".to_string(),
            ssh_agent: "/usr/bin/ssh-agent".to_string(),
            ssh_add: "/usr/bin/ssh-add".to_string(),
            ssh_keyscan: "/usr/bin/ssh-keyscan".to_string(),
        }
    }
}

/// Provisioning configuration
///
/// Every file the provisioners write is resolved against these paths, so
/// tests point them at a temporary directory instead of the real home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Home directory holding `.gitconfig`, `.subversion/` and `.ssh/`
    pub home_dir: PathBuf,

    /// Directory for the agent socket and the askpass script
    pub tmp_dir: PathBuf,

    /// System-wide known hosts file
    pub known_hosts: PathBuf,

    /// Directory where `settings.xml` is generated
    pub work_dir: PathBuf,

    #[validate(nested)]
    pub programs: Programs,

    /// Upper bound for `ssh-add`, which may wait on the askpass script
    #[validate(range(min = 1, max = 300))]
    pub ssh_add_timeout_secs: u64,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            home_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            tmp_dir: PathBuf::from("/tmp"),
            known_hosts: PathBuf::from("/etc/ssh/ssh_known_hosts"),
            work_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            programs: Programs::default(),
            ssh_add_timeout_secs: 1,
        }
    }
}

impl ProvisionConfig {
    /// Configuration rooted at `root`: home, tmp, work dir and known hosts
    /// all live underneath it.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            home_dir: root.join("home"),
            tmp_dir: root.join("tmp"),
            known_hosts: root.join("etc").join("ssh_known_hosts"),
            work_dir: root.join("work"),
            ..Self::default()
        }
    }

    pub fn with_home_dir(mut self, home_dir: impl Into<PathBuf>) -> Self {
        self.home_dir = home_dir.into();
        self
    }

    pub fn ssh_add_timeout(&self) -> Duration {
        Duration::from_secs(self.ssh_add_timeout_secs)
    }

    pub fn ssh_dir(&self) -> PathBuf {
        self.home_dir.join(".ssh")
    }

    pub fn subversion_dir(&self) -> PathBuf {
        self.home_dir.join(".subversion")
    }
}
