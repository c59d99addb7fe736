use crate::application::task_context::{RepositoryTarget, TaskContext};
use crate::common::error::ProvisionError;
use crate::common::result::ProvisionResult;
use serde::Serialize;

/// コミットの設定
#[derive(Debug, Clone)]
pub struct CommitRepositoryConfig {
    /// `target.branch`が指定されていればそのブランチへpushする
    pub target: RepositoryTarget,

    /// ステージするファイル（空なら追加しない）
    pub files: Vec<String>,

    pub message: String,
}

impl CommitRepositoryConfig {
    pub fn new(target: RepositoryTarget, message: impl Into<String>) -> Self {
        Self {
            target,
            files: Vec::new(),
            message: message.into(),
        }
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRepositoryResult {
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// ステージ、コミット、pushを行うユースケース
pub struct CommitRepositoryUseCase {
    config: CommitRepositoryConfig,
}

impl CommitRepositoryUseCase {
    pub fn new(config: CommitRepositoryConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self, task: &TaskContext) -> ProvisionResult<CommitRepositoryResult> {
        if self.config.message.trim().is_empty() {
            return Err(ProvisionError::soft("Commit message is empty"));
        }

        let scm = task.open_scm(&self.config.target).await?;
        scm.commit(&self.config.files, &self.config.message).await?;

        Ok(CommitRepositoryResult {
            files: self.config.files.clone(),
            branch: scm.remote().repository.branch().map(str::to_string),
        })
    }
}
