use crate::application::task_context::{RepositoryTarget, TaskContext};
use crate::common::result::ProvisionResult;
use crate::domain::value_objects::scm_type::ScmType;
use serde::Serialize;
use std::path::PathBuf;

/// リポジトリ取得の設定
#[derive(Debug, Clone)]
pub struct FetchRepositoryConfig {
    pub target: RepositoryTarget,
}

impl FetchRepositoryConfig {
    pub fn new(target: RepositoryTarget) -> Self {
        Self { target }
    }
}

/// リポジトリ取得の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRepositoryResult {
    pub kind: ScmType,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub path: PathBuf,
}

/// リポジトリ取得のユースケース
///
/// 作業ディレクトリを削除し、資格情報を配置してからクリーンチェックアウトする。
pub struct FetchRepositoryUseCase {
    config: FetchRepositoryConfig,
}

impl FetchRepositoryUseCase {
    pub fn new(config: FetchRepositoryConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self, task: &TaskContext) -> ProvisionResult<FetchRepositoryResult> {
        // 1. ドライバを作成（URLの検証を含む）
        let scm = task.open_scm(&self.config.target).await?;

        // 2. クリーンチェックアウト
        scm.fetch().await?;

        let remote = scm.remote();
        tracing::info!(
            kind = %scm.scm_type(),
            path = %scm.path().display(),
            "fetched {}",
            remote.repository.url
        );

        Ok(FetchRepositoryResult {
            kind: scm.scm_type(),
            url: remote.repository.url.clone(),
            branch: remote.repository.branch().map(str::to_string),
            path: scm.path().to_path_buf(),
        })
    }
}
