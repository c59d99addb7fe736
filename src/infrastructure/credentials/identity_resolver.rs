use crate::common::result::ProvisionResult;
use crate::domain::entities::identity::{Identity, IdentityRef};
use crate::infrastructure::registry::Registry;

/// Resolves identity references against the registry.
///
/// Absence of a matching identity is not an error: callers proceed
/// unauthenticated.
pub struct CredentialResolver<'a> {
    registry: &'a dyn Registry,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(registry: &'a dyn Registry) -> Self {
        Self { registry }
    }

    pub async fn get(&self, reference: IdentityRef) -> ProvisionResult<Identity> {
        self.registry.identity(reference.id).await
    }

    /// First identity of `kind`, following the order of `references`
    pub async fn find(
        &self,
        references: &[IdentityRef],
        kind: &str,
    ) -> ProvisionResult<Option<Identity>> {
        for reference in references {
            let identity = self.get(*reference).await?;
            if identity.kind == kind {
                return Ok(Some(identity));
            }
        }
        Ok(None)
    }

    /// Identity of `kind` for an application.
    ///
    /// The explicit references are tried first, then the identities attached
    /// to the application in the registry.
    pub async fn for_application(
        &self,
        application_id: Option<u64>,
        references: &[IdentityRef],
        kind: &str,
    ) -> ProvisionResult<Option<Identity>> {
        if let Some(identity) = self.find(references, kind).await? {
            return Ok(Some(identity));
        }
        match application_id {
            Some(id) => self.registry.application_identity(id, kind).await,
            None => Ok(None),
        }
    }
}
