use crate::common::error::ProvisionError;
use crate::common::result::ProvisionResult;
use crate::domain::entities::identity::{Identity, IdentityRef};
use crate::domain::entities::repository::RepositoryDescriptor;
use crate::domain::value_objects::remote_url::RemoteUrl;
use crate::domain::value_objects::scm_type::ScmType;
use crate::infrastructure::context::ProvisionContext;
use crate::infrastructure::credentials::CredentialResolver;
use crate::infrastructure::ssh::SshAgent;

/// Remote repository bound to an SCM driver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remote {
    pub repository: RepositoryDescriptor,

    /// Application whose attached identities are the credential fallback
    pub application_id: Option<u64>,

    /// Identities supplied with the task, tried first
    pub identities: Vec<IdentityRef>,

    /// Plain http remotes allowed and TLS verification off
    pub insecure: bool,
}

impl Remote {
    pub fn new(repository: RepositoryDescriptor) -> Self {
        Self {
            repository,
            ..Self::default()
        }
    }

    pub fn with_application(mut self, application_id: u64) -> Self {
        self.application_id = Some(application_id);
        self
    }

    pub fn with_identities(mut self, identities: Vec<IdentityRef>) -> Self {
        self.identities = identities;
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn url(&self) -> ProvisionResult<RemoteUrl> {
        RemoteUrl::parse(&self.repository.url)
            .map_err(|e| ProvisionError::invalid_url(&self.repository.url, e.to_string()))
    }

    /// Plain http is refused unless the kind's insecure setting is on.
    pub fn validate(&self, scm_type: ScmType) -> ProvisionResult<()> {
        let url = self.url()?;
        if url.is_plain_http() && !self.insecure {
            return Err(ProvisionError::insecure_transport(scm_type.insecure_setting()));
        }
        Ok(())
    }
}

/// The `source` identity for the remote, or an empty identity when none is
/// configured.
pub(crate) async fn resolve_source_identity(
    ctx: &ProvisionContext,
    remote: &Remote,
    tag: &str,
) -> ProvisionResult<Identity> {
    let resolver = CredentialResolver::new(ctx.registry());
    let found = resolver
        .for_application(remote.application_id, &remote.identities, Identity::SOURCE)
        .await?;

    match found {
        Some(identity) => {
            ctx.activity().add(format!(
                "{} Using credentials (id={}) {}.",
                tag, identity.id, identity.name
            ));
            Ok(identity)
        }
        None => Ok(Identity::default()),
    }
}

/// Start the agent (best effort) and add the identity's key for `host`.
pub(crate) async fn provision_ssh(
    ctx: &ProvisionContext,
    identity: &Identity,
    host: &str,
) -> ProvisionResult<()> {
    let agent = SshAgent::new(ctx);
    if let Err(e) = agent.start().await {
        // An agent may already be reachable through the inherited environment.
        tracing::warn!("ssh-agent not started: {}", e);
        ctx.activity().add(format!("[SSH] Agent not started: {}", e));
    }
    agent.add(identity, host).await
}
