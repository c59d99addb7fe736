use crate::common::result::ProvisionResult;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::proxy::Proxy;
use crate::domain::entities::repository::Application;
use crate::domain::value_objects::proxy_kind::ProxyKind;
use async_trait::async_trait;
use std::path::Path;

/// Remote registry holding identities, proxies, applications and settings.
///
/// Lookups by ID fail with a registry error when the record is missing.
/// Lookups by kind return `None` instead, since an unconfigured credential or
/// proxy is a normal situation.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn identity(&self, id: u64) -> ProvisionResult<Identity>;

    async fn application(&self, id: u64) -> ProvisionResult<Application>;

    /// First identity of `kind` attached to the application
    async fn application_identity(
        &self,
        application_id: u64,
        kind: &str,
    ) -> ProvisionResult<Option<Identity>>;

    /// First enabled proxy of `kind`
    async fn find_proxy(&self, kind: ProxyKind) -> ProvisionResult<Option<Proxy>>;

    async fn proxies(&self) -> ProvisionResult<Vec<Proxy>>;

    /// Boolean setting; a missing key reads as `false`
    async fn setting_bool(&self, key: &str) -> ProvisionResult<bool>;

    /// Attach a file (e.g. the log artifact) to the running task
    async fn attach_artifact(&self, path: &Path) -> ProvisionResult<()>;
}
