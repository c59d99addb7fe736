use crate::application::task_context::TaskContext;
use crate::common::result::ProvisionResult;
use crate::infrastructure::build::Maven;
use serde::Serialize;
use std::path::PathBuf;

/// Maven操作の種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MavenAction {
    /// 依存関係を`bin_dir`へコピー
    FetchDependencies { source: PathBuf },
    /// アプリケーションのバイナリを取得
    FetchArtifact,
    /// ローカルリポジトリへインストール
    Install { source: PathBuf },
    /// ローカルリポジトリから削除
    Delete { source: PathBuf },
    /// POMがモジュールを持つか
    HasModules { source: PathBuf },
}

impl MavenAction {
    pub fn name(&self) -> &'static str {
        match self {
            MavenAction::FetchDependencies { .. } => "deps",
            MavenAction::FetchArtifact => "artifact",
            MavenAction::Install { .. } => "install",
            MavenAction::Delete { .. } => "delete",
            MavenAction::HasModules { .. } => "modules",
        }
    }
}

/// Maven操作の設定
#[derive(Debug, Clone)]
pub struct MavenTaskConfig {
    pub application_id: u64,
    pub action: MavenAction,

    /// 取得したアーティファクトの出力先
    pub bin_dir: PathBuf,

    /// ローカルリポジトリ（未指定なら`<home>/.m2/repository`）
    pub m2_dir: Option<PathBuf>,
}

impl MavenTaskConfig {
    pub fn new(application_id: u64, action: MavenAction, bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            application_id,
            action,
            bin_dir: bin_dir.into(),
            m2_dir: None,
        }
    }

    pub fn with_m2_dir(mut self, m2_dir: impl Into<PathBuf>) -> Self {
        self.m2_dir = Some(m2_dir.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MavenTaskResult {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_modules: Option<bool>,
}

/// Maven操作のユースケース
pub struct MavenTaskUseCase {
    config: MavenTaskConfig,
}

impl MavenTaskUseCase {
    pub fn new(config: MavenTaskConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self, task: &TaskContext) -> ProvisionResult<MavenTaskResult> {
        let application = task.application(self.config.application_id).await?;
        let m2_dir = self
            .config
            .m2_dir
            .clone()
            .unwrap_or_else(|| task.config().home_dir.join(".m2").join("repository"));
        let maven = Maven::new(task.provision(), application, &self.config.bin_dir, m2_dir);

        let action = &self.config.action;
        let mut result = MavenTaskResult {
            action: action.name(),
            settings: Some(maven.settings_path()),
            has_modules: None,
        };

        match action {
            MavenAction::FetchDependencies { source } => maven.fetch(source).await?,
            MavenAction::FetchArtifact => maven.fetch_artifact().await?,
            MavenAction::Install { source } => maven.install_artifacts(source).await?,
            MavenAction::Delete { source } => maven.delete_artifacts(source).await?,
            MavenAction::HasModules { source } => {
                result.settings = None;
                result.has_modules = Some(maven.has_modules(source).await?);
            }
        }

        Ok(result)
    }
}
