use super::identity_resolver::CredentialResolver;
use super::userinfo::userinfo;
use crate::common::result::ProvisionResult;
use crate::domain::entities::proxy::Proxy;
use crate::domain::value_objects::proxy_kind::ProxyKind;
use crate::domain::value_objects::remote_url::RemoteUrl;
use crate::infrastructure::registry::Registry;

/// Proxy authentication taken from the proxy's identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAuth {
    pub user: String,
    pub password: String,
}

/// An enabled proxy with its credentials resolved.
///
/// Tool agnostic; each driver renders it in its own configuration format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProxy {
    pub id: u64,
    pub kind: ProxyKind,
    pub host: String,
    /// 0 when unset
    pub port: u16,
    pub auth: Option<ProxyAuth>,
    pub excluded: Vec<String>,
}

impl ResolvedProxy {
    /// `kind://[user:password@]host[:port]`, the form git expects for
    /// `http.proxy`
    pub fn url(&self) -> String {
        let mut url = format!("{}://", self.kind);
        if let Some(auth) = &self.auth {
            url.push_str(&format!("{}@", userinfo(&auth.user, &auth.password)));
        }
        url.push_str(&self.host);
        if self.port > 0 {
            url.push_str(&format!(":{}", self.port));
        }
        url
    }

    /// `[global]` stanza of the Subversion `servers` file
    pub fn svn_global(&self) -> String {
        let mut stanza = String::from("[global]\n");
        stanza.push_str(&format!("http-proxy-host = {}\n", self.host));
        if self.port > 0 {
            stanza.push_str(&format!("http-proxy-port = {}\n", self.port));
        }
        if let Some(auth) = &self.auth {
            stanza.push_str(&format!("http-proxy-username = {}\n", auth.user));
            stanza.push_str(&format!("http-proxy-password = {}\n", auth.password));
        }
        if !self.excluded.is_empty() {
            stanza.push_str(&format!(
                "http-proxy-exceptions = {}\n",
                self.excluded.join(" ")
            ));
        }
        stanza
    }
}

/// Finds the proxy to use for a remote
pub struct ProxyResolver<'a> {
    registry: &'a dyn Registry,
}

impl<'a> ProxyResolver<'a> {
    pub fn new(registry: &'a dyn Registry) -> Self {
        Self { registry }
    }

    /// Enabled proxy for the remote's transport, unless the remote host is
    /// excluded.
    pub async fn resolve(&self, url: &RemoteUrl) -> ProvisionResult<Option<ResolvedProxy>> {
        let Some(kind) = url.proxy_kind() else {
            return Ok(None);
        };
        let Some(proxy) = self.registry.find_proxy(kind).await? else {
            return Ok(None);
        };
        if !proxy.enabled {
            return Ok(None);
        }
        if proxy.excludes(url.host()) || proxy.excludes(&url.authority()) {
            tracing::debug!("{} excluded from proxy {}", url.host(), proxy.id);
            return Ok(None);
        }
        self.complete(proxy).await.map(Some)
    }

    /// Every enabled proxy
    pub async fn enabled(&self) -> ProvisionResult<Vec<ResolvedProxy>> {
        let mut resolved = Vec::new();
        for proxy in self.registry.proxies().await? {
            if proxy.enabled {
                resolved.push(self.complete(proxy).await?);
            }
        }
        Ok(resolved)
    }

    async fn complete(&self, proxy: Proxy) -> ProvisionResult<ResolvedProxy> {
        let auth = match proxy.identity {
            Some(reference) => {
                let identity = CredentialResolver::new(self.registry).get(reference).await?;
                Some(ProxyAuth {
                    user: identity.user,
                    password: identity.password,
                })
            }
            None => None,
        };
        Ok(ResolvedProxy {
            id: proxy.id,
            kind: proxy.kind,
            host: proxy.host,
            port: proxy.port,
            auth,
            excluded: proxy.excluded,
        })
    }
}
