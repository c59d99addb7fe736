//! # scm-provision - Repository fetch & credential provisioning
//!
//! `scm-provision` checks out an application's source repository (Git or
//! Subversion) into a working directory and provisions what the external
//! tools need to reach it: credential files, proxy configuration, SSH keys
//! loaded into an agent, known-host entries, and a Maven `settings.xml`.
//!
//! All external programs (`git`, `svn`, `mvn`, `ssh-agent`, `ssh-add`,
//! `ssh-keyscan`) are run through a single executor that records an
//! activity log for the task.
//!
//! ## Architecture
//!
//! - [`domain`]: repositories, identities, proxies, remote URLs, configuration
//! - [`application`]: task use cases (fetch, branch, commit, maven)
//! - [`infrastructure`]: process execution, registry, credentials, SSH, SCM and Maven drivers
//! - [`presentation`]: command line entry point
//! - [`common`]: error type, result alias and the activity log
//!
//! ## Example
//!
//! ```rust,no_run
//! use scm_provision::application::{RepositoryTarget, TaskContext};
//! use scm_provision::application::use_cases::{FetchRepositoryConfig, FetchRepositoryUseCase};
//! use scm_provision::common::activity::ActivityLog;
//! use scm_provision::domain::entities::provision_config::ProvisionConfig;
//! use scm_provision::infrastructure::process::SystemRunner;
//! use scm_provision::infrastructure::registry::InMemoryRegistry;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> scm_provision::Result<()> {
//! let registry = InMemoryRegistry::load(Path::new("registry.yaml"))?;
//! let task = TaskContext::new(
//!     ProvisionConfig::default(),
//!     Arc::new(registry),
//!     Arc::new(SystemRunner::new()),
//!     ActivityLog::new(),
//! );
//!
//! let config = FetchRepositoryConfig::new(RepositoryTarget::new(7, "/work/src"));
//! let fetched = FetchRepositoryUseCase::new(config).execute(&task).await?;
//! println!("Fetched {} into {}", fetched.url, fetched.path.display());
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::ProvisionError;
pub use crate::common::result::ProvisionResult as Result;
