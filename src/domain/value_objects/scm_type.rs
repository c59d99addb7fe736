use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// SCM (Source Control Management) system type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmType {
    /// Git version control system
    Git,
    /// Subversion (SVN) version control system
    #[serde(rename = "subversion", alias = "svn")]
    Svn,
}

impl Default for ScmType {
    fn default() -> Self {
        Self::Git
    }
}

impl fmt::Display for ScmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScmType::Git => write!(f, "git"),
            ScmType::Svn => write!(f, "subversion"),
        }
    }
}

impl FromStr for ScmType {
    type Err = ScmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "git" => Ok(ScmType::Git),
            "svn" | "subversion" => Ok(ScmType::Svn),
            _ => Err(ScmTypeError::UnsupportedScmType(s.to_string())),
        }
    }
}

impl ScmType {
    /// Map a repository kind string onto a driver.
    ///
    /// Anything that is not Subversion (including an empty kind) is handled
    /// by Git.
    pub fn from_kind(kind: &str) -> Self {
        match kind.parse() {
            Ok(ScmType::Svn) => ScmType::Svn,
            _ => ScmType::Git,
        }
    }

    /// Setting key that allows plain http remotes and skips TLS verification
    pub fn insecure_setting(&self) -> &'static str {
        match self {
            ScmType::Git => "git.insecure.enabled",
            ScmType::Svn => "svn.insecure.enabled",
        }
    }

    /// Prefix used for activity lines
    pub fn activity_tag(&self) -> &'static str {
        match self {
            ScmType::Git => "[GIT]",
            ScmType::Svn => "[SVN]",
        }
    }
}

/// Repository kind that no driver handles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScmTypeError {
    #[error("Unsupported repository kind '{0}' (expected git or subversion)")]
    UnsupportedScmType(String),
}
