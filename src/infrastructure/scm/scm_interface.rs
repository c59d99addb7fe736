use super::remote::Remote;
use crate::common::result::ProvisionResult;
use crate::domain::value_objects::scm_type::ScmType;
use async_trait::async_trait;
use std::path::Path;

/// Common interface for all SCM drivers.
///
/// One instance serves one fetch/branch/commit lifecycle for a single
/// working directory.
#[async_trait]
pub trait Scm: Send + Sync {
    /// Get the SCM type this implementation handles
    fn scm_type(&self) -> ScmType;

    /// Working directory the repository is checked out into
    fn path(&self) -> &Path;

    fn remote(&self) -> &Remote;

    /// Check the remote URL against the insecure-transport policy
    async fn validate(&self) -> ProvisionResult<()>;

    /// Clean checkout of the remote into `path`
    async fn fetch(&self) -> ProvisionResult<()>;

    /// Switch to `name`, creating the branch when it does not exist
    async fn branch(&mut self, name: &str) -> ProvisionResult<()>;

    /// Stage `files`, commit and push
    async fn commit(&self, files: &[String], message: &str) -> ProvisionResult<()>;
}
