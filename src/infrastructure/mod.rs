/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - Process execution and the activity log
/// - Registry access (identities, proxies, settings)
/// - Credential files, SSH keys and the agent
/// - SCM drivers (Git, Subversion) and the Maven driver
pub mod build;
pub mod context;
pub mod credentials;
pub mod filesystem;
pub mod process;
pub mod registry;
pub mod scm;
pub mod ssh;

// Re-export commonly used types
pub use context::{Environment, ProvisionContext};
pub use filesystem::{ConfigStore, Provisioned, ProvisionedFile};
pub use process::{Command, CommandExecutor, CommandRunner, RunMode};
pub use registry::{InMemoryRegistry, Registry};
pub use scm::{Remote, Scm, ScmFactory};
