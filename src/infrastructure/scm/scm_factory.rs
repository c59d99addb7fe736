use super::git_scm::GitScm;
use super::remote::Remote;
use super::scm_interface::Scm;
use super::svn_scm::SvnScm;
use crate::common::result::ProvisionResult;
use crate::domain::value_objects::scm_type::ScmType;
use crate::infrastructure::context::ProvisionContext;
use std::path::PathBuf;
use std::sync::Arc;

/// Factory for creating SCM implementation instances
pub struct ScmFactory;

impl ScmFactory {
    /// Create the driver for the remote's repository kind.
    ///
    /// The kind's insecure setting is read from the registry and the remote
    /// is validated before the driver is returned.
    pub async fn create(
        ctx: Arc<ProvisionContext>,
        dest: impl Into<PathBuf>,
        remote: Remote,
    ) -> ProvisionResult<Box<dyn Scm>> {
        let scm_type = remote.repository.scm_type();
        let insecure = ctx.setting(scm_type.insecure_setting()).await?;
        let remote = remote.with_insecure(insecure);

        let scm: Box<dyn Scm> = match scm_type {
            ScmType::Git => Box::new(GitScm::new(ctx, dest, remote)),
            ScmType::Svn => Box::new(SvnScm::new(ctx, dest, remote)),
        };
        scm.validate().await?;

        tracing::debug!(kind = %scm_type, path = %scm.path().display(), "created SCM driver");
        Ok(scm)
    }
}
