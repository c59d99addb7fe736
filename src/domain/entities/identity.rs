use serde::{Deserialize, Serialize};
use std::fmt;

/// 資格情報（Identity）への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityRef {
    pub id: u64,
}

impl IdentityRef {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

/// 保存された資格情報
///
/// `kind`は用途を表すタグ（`source`、`maven`、プロキシ認証など）。
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub user: String,

    /// パスワード。秘密鍵を持つ場合はそのパスフレーズとして使われる
    #[serde(default)]
    pub password: String,

    /// 秘密鍵（PEM）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// ツール固有の設定（Mavenのsettings.xmlなど）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<String>,
}

impl Identity {
    /// SCMのチェックアウトに使う資格情報
    pub const SOURCE: &'static str = "source";
    /// Mavenの設定・資格情報
    pub const MAVEN: &'static str = "maven";
    /// プロキシ認証
    pub const PROXY: &'static str = "proxy";

    pub fn new(id: u64, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_settings(mut self, settings: impl Into<String>) -> Self {
        self.settings = Some(settings.into());
        self
    }

    /// ユーザー名とパスワードの両方を持つか
    pub fn has_basic_auth(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }

    /// 空でない秘密鍵
    pub fn private_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn passphrase(&self) -> Option<&str> {
        Some(self.password.as_str()).filter(|p| !p.is_empty())
    }
}

// Secrets never reach logs through Debug.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("user", &self.user)
            .field("password", &redacted(!self.password.is_empty()))
            .field("key", &redacted(self.key.is_some()))
            .field("settings", &self.settings.as_ref().map(|_| "<settings>"))
            .finish()
    }
}

fn redacted(present: bool) -> &'static str {
    if present {
        "<redacted>"
    } else {
        ""
    }
}
