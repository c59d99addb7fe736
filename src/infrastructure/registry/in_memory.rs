use super::registry_interface::Registry;
use crate::common::error::ProvisionError;
use crate::common::result::ProvisionResult;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::proxy::Proxy;
use crate::domain::entities::repository::Application;
use crate::domain::value_objects::proxy_kind::ProxyKind;
use crate::infrastructure::filesystem::config_store::ConfigStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Registry content as stored in a YAML document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryDocument {
    pub identities: Vec<Identity>,
    pub proxies: Vec<Proxy>,
    pub applications: Vec<Application>,
    pub settings: BTreeMap<String, bool>,
}

/// Registry backed by an in-process document.
///
/// Used by the command line (loaded from YAML) and by tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    document: RegistryDocument,
    attached: Arc<Mutex<Vec<PathBuf>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: RegistryDocument) -> Self {
        Self {
            document,
            attached: Arc::default(),
        }
    }

    /// Load a registry document from a YAML file
    pub fn load(path: &Path) -> ProvisionResult<Self> {
        let document: RegistryDocument = ConfigStore::new().read_yaml(path)?;
        tracing::debug!(
            identities = document.identities.len(),
            proxies = document.proxies.len(),
            applications = document.applications.len(),
            "loaded registry from {}",
            path.display()
        );
        Ok(Self::from_document(document))
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.document.identities.push(identity);
        self
    }

    pub fn with_proxy(mut self, proxy: Proxy) -> Self {
        self.document.proxies.push(proxy);
        self
    }

    pub fn with_application(mut self, application: Application) -> Self {
        self.document.applications.push(application);
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: bool) -> Self {
        self.document.settings.insert(key.into(), value);
        self
    }

    /// Files attached so far
    pub fn attached(&self) -> Vec<PathBuf> {
        self.attached.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lookup_identity(&self, id: u64) -> ProvisionResult<&Identity> {
        self.document
            .identities
            .iter()
            .find(|identity| identity.id == id)
            .ok_or_else(|| ProvisionError::registry_error(format!("Identity {} not found", id)))
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn identity(&self, id: u64) -> ProvisionResult<Identity> {
        self.lookup_identity(id).cloned()
    }

    async fn application(&self, id: u64) -> ProvisionResult<Application> {
        self.document
            .applications
            .iter()
            .find(|app| app.id == id)
            .cloned()
            .ok_or_else(|| ProvisionError::registry_error(format!("Application {} not found", id)))
    }

    async fn application_identity(
        &self,
        application_id: u64,
        kind: &str,
    ) -> ProvisionResult<Option<Identity>> {
        let application = self.application(application_id).await?;
        for reference in &application.identities {
            let identity = self.lookup_identity(reference.id)?;
            if identity.kind == kind {
                return Ok(Some(identity.clone()));
            }
        }
        Ok(None)
    }

    async fn find_proxy(&self, kind: ProxyKind) -> ProvisionResult<Option<Proxy>> {
        Ok(self
            .document
            .proxies
            .iter()
            .find(|proxy| proxy.kind == kind && proxy.enabled)
            .cloned())
    }

    async fn proxies(&self) -> ProvisionResult<Vec<Proxy>> {
        Ok(self.document.proxies.clone())
    }

    async fn setting_bool(&self, key: &str) -> ProvisionResult<bool> {
        Ok(self.document.settings.get(key).copied().unwrap_or(false))
    }

    async fn attach_artifact(&self, path: &Path) -> ProvisionResult<()> {
        let mut attached = self.attached.lock().unwrap_or_else(|e| e.into_inner());
        if !attached.iter().any(|p| p == path) {
            attached.push(path.to_path_buf());
        }
        Ok(())
    }
}
