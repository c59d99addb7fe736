use crate::application::task_context::{RepositoryTarget, TaskContext};
use crate::common::error::ProvisionError;
use crate::common::result::ProvisionResult;
use serde::Serialize;
use std::path::PathBuf;

/// ブランチ切り替えの設定
#[derive(Debug, Clone)]
pub struct BranchRepositoryConfig {
    pub target: RepositoryTarget,

    /// 切り替え先（存在しなければ作成）
    pub name: String,
}

impl BranchRepositoryConfig {
    pub fn new(target: RepositoryTarget, name: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchRepositoryResult {
    pub branch: String,
    pub path: PathBuf,
}

/// 取得済みの作業ディレクトリでブランチを切り替えるユースケース
pub struct BranchRepositoryUseCase {
    config: BranchRepositoryConfig,
}

impl BranchRepositoryUseCase {
    pub fn new(config: BranchRepositoryConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self, task: &TaskContext) -> ProvisionResult<BranchRepositoryResult> {
        if self.config.name.trim().is_empty() {
            return Err(ProvisionError::soft("Branch name is empty"));
        }

        let mut scm = task.open_scm(&self.config.target).await?;
        scm.branch(&self.config.name).await?;

        Ok(BranchRepositoryResult {
            branch: self.config.name.clone(),
            path: scm.path().to_path_buf(),
        })
    }
}
