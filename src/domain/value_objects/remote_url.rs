use super::proxy_kind::ProxyKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;
use url::Url;

static SCP_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:([^@/:]+)@)?([^@/:]+):(.*)$").expect("valid regex"));

/// リモートURL関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum RemoteUrlError {
    #[error("Empty URL")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),
}

/// リモートの表記形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteForm {
    /// `scheme://host/path`
    Url,
    /// `user@host:path`（SCP形式）
    Scp,
    /// ローカルパス
    Local,
}

/// リポジトリのリモートURLの値オブジェクト
///
/// 標準的なURLに加えて、Gitが受け付けるSCP形式（`git@github.com:org/repo.git`）
/// とローカルパスを扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    /// 入力されたURL文字列
    raw: String,

    /// 表記形式
    form: RemoteForm,

    /// スキーム（SCP形式とローカルパスでは空）
    scheme: String,

    /// ユーザー名
    user: Option<String>,

    /// ホスト名
    host: String,

    /// ポート番号（既定ポートの場合はNone）
    port: Option<u16>,

    /// パス
    path: String,
}

impl RemoteUrl {
    /// 文字列からRemoteUrlを作成
    pub fn parse(raw: &str) -> Result<Self, RemoteUrlError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RemoteUrlError::Empty);
        }

        if trimmed.contains("://") {
            let url = Url::parse(trimmed)
                .map_err(|e| RemoteUrlError::InvalidFormat(e.to_string()))?;
            let user = Some(url.username())
                .filter(|u| !u.is_empty())
                .map(|u| u.to_string());
            return Ok(Self {
                raw: trimmed.to_string(),
                form: RemoteForm::Url,
                scheme: url.scheme().to_string(),
                user,
                host: url.host_str().unwrap_or_default().to_string(),
                port: url.port(),
                path: url.path().to_string(),
            });
        }

        if trimmed.starts_with('/') || trimmed.starts_with("./") || trimmed.starts_with("../") {
            return Ok(Self {
                raw: trimmed.to_string(),
                form: RemoteForm::Local,
                scheme: String::new(),
                user: None,
                host: String::new(),
                port: None,
                path: trimmed.to_string(),
            });
        }

        if let Some(captures) = SCP_LIKE.captures(trimmed) {
            return Ok(Self {
                raw: trimmed.to_string(),
                form: RemoteForm::Scp,
                scheme: String::new(),
                user: captures.get(1).map(|m| m.as_str().to_string()),
                host: captures[2].to_string(),
                port: None,
                path: captures[3].to_string(),
            });
        }

        Err(RemoteUrlError::InvalidFormat(format!(
            "missing scheme in '{}'",
            trimmed
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn form(&self) -> RemoteForm {
        self.form
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `host[:port]`
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    pub fn is_plain_http(&self) -> bool {
        self.form == RemoteForm::Url && self.scheme == "http"
    }

    /// Proxy transport used to reach this remote.
    ///
    /// SCP-style remotes are matched against https proxies.
    pub fn proxy_kind(&self) -> Option<ProxyKind> {
        match (self.form, self.scheme.as_str()) {
            (RemoteForm::Url, "http") => Some(ProxyKind::Http),
            (RemoteForm::Url, "https") => Some(ProxyKind::Https),
            (RemoteForm::Scp, _) => Some(ProxyKind::Https),
            _ => None,
        }
    }

    /// Append a path segment, e.g. a Subversion branch directory.
    pub fn join_segment(&self, segment: &str) -> Self {
        let segment = segment.trim_matches('/');
        if self.form == RemoteForm::Url {
            if let Ok(mut url) = Url::parse(&self.raw) {
                let base = url.path().trim_end_matches('/').to_string();
                url.set_path(&format!("{}/{}", base, segment));
                return Self {
                    raw: url.to_string(),
                    path: url.path().to_string(),
                    ..self.clone()
                };
            }
        }
        let raw = format!("{}/{}", self.raw.trim_end_matches('/'), segment);
        let path = format!("{}/{}", self.path.trim_end_matches('/'), segment);
        Self {
            raw,
            path,
            ..self.clone()
        }
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
