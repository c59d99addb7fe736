use super::identity::IdentityRef;
use crate::domain::value_objects::scm_type::ScmType;
use serde::{Deserialize, Serialize};

/// リモートリポジトリの記述
///
/// 1回の操作中は変更しない。Gitの`branch`操作だけが`branch`を更新する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// リポジトリの種類（`git`、`subversion`）。空の場合はGit
    #[serde(default)]
    pub kind: String,

    /// リモートのURL
    pub url: String,

    /// 対象ブランチ名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl RepositoryDescriptor {
    /// 新しいRepositoryDescriptorを作成
    pub fn new(kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
            branch: None,
        }
    }

    /// ブランチを設定
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn scm_type(&self) -> ScmType {
        ScmType::from_kind(&self.kind)
    }

    /// 空文字列を除いたブランチ名
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref().filter(|b| !b.is_empty())
    }
}

/// アプリケーション（タスクの対象）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    /// Mavenアーティファクト座標（`group:artifact:version[:packaging]`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryDescriptor>,

    /// アプリケーションに紐付いた資格情報
    #[serde(default)]
    pub identities: Vec<IdentityRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_branch_is_unset() {
        let repo = RepositoryDescriptor::new("git", "https://example.com/app.git").with_branch("");
        assert_eq!(repo.branch(), None);

        let repo = repo.with_branch("main");
        assert_eq!(repo.branch(), Some("main"));
    }

    #[test]
    fn test_kind_selects_driver() {
        assert_eq!(RepositoryDescriptor::new("", "x").scm_type(), ScmType::Git);
        assert_eq!(
            RepositoryDescriptor::new("subversion", "x").scm_type(),
            ScmType::Svn
        );
    }

    #[test]
    fn test_application_from_yaml() {
        let yaml = r#"
id: 4
name: petclinic
binary: org.example:petclinic:1.0:war
repository:
  kind: git
  url: https://example.com/petclinic.git
  branch: main
identities:
  - id: 1
  - id: 2
"#;
        let app: Application = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(app.identities, vec![IdentityRef::new(1), IdentityRef::new(2)]);
        assert_eq!(app.repository.unwrap().branch(), Some("main"));
    }
}
