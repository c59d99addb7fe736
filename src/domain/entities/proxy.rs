use super::identity::IdentityRef;
use crate::domain::value_objects::proxy_kind::ProxyKind;
use serde::{Deserialize, Serialize};

/// 保存されたフォワードプロキシの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proxy {
    pub id: u64,

    pub kind: ProxyKind,

    pub host: String,

    /// 0は未設定
    #[serde(default)]
    pub port: u16,

    #[serde(default)]
    pub enabled: bool,

    /// プロキシを経由しないホスト
    #[serde(default)]
    pub excluded: Vec<String>,

    /// プロキシ認証に使う資格情報
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityRef>,
}

impl Proxy {
    pub fn new(id: u64, kind: ProxyKind, host: impl Into<String>, port: u16) -> Self {
        Self {
            id,
            kind,
            host: host.into(),
            port,
            enabled: true,
            excluded: Vec::new(),
            identity: None,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_excluded(mut self, hosts: Vec<String>) -> Self {
        self.excluded = hosts;
        self
    }

    pub fn with_identity(mut self, identity: IdentityRef) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn excludes(&self, host: &str) -> bool {
        self.excluded.iter().any(|h| h == host)
    }
}
