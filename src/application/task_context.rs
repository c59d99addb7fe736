use super::task_report::TaskReport;
use crate::common::activity::ActivityLog;
use crate::common::error::ProvisionError;
use crate::common::result::ProvisionResult;
use crate::domain::entities::identity::IdentityRef;
use crate::domain::entities::provision_config::ProvisionConfig;
use crate::domain::entities::repository::Application;
use crate::infrastructure::context::ProvisionContext;
use crate::infrastructure::filesystem::ProvisionedFile;
use crate::infrastructure::process::{CommandExecutor, CommandRunner};
use crate::infrastructure::registry::Registry;
use crate::infrastructure::scm::{Remote, Scm, ScmFactory};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// 操作対象のリポジトリ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryTarget {
    /// リポジトリを持つアプリケーション
    pub application_id: u64,

    /// 作業ディレクトリ
    pub dest: PathBuf,

    /// タスクで指定された資格情報（アプリケーションの資格情報より優先）
    pub identities: Vec<IdentityRef>,

    /// ブランチの上書き
    pub branch: Option<String>,
}

impl RepositoryTarget {
    pub fn new(application_id: u64, dest: impl Into<PathBuf>) -> Self {
        Self {
            application_id,
            dest: dest.into(),
            ..Self::default()
        }
    }

    pub fn with_identities(mut self, identities: Vec<IdentityRef>) -> Self {
        self.identities = identities;
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// タスク1回分の実行コンテキスト
///
/// 設定、レジストリ、コマンドランナー、アクティビティログをまとめる。
pub struct TaskContext {
    provision: Arc<ProvisionContext>,
    registry: Arc<dyn Registry>,
}

impl TaskContext {
    pub fn new(
        config: ProvisionConfig,
        registry: Arc<dyn Registry>,
        runner: Arc<dyn CommandRunner>,
        activity: ActivityLog,
    ) -> Self {
        let executor = CommandExecutor::new(runner, activity);
        let provision = ProvisionContext::new(config, Arc::clone(&registry), executor);
        Self {
            provision: Arc::new(provision),
            registry,
        }
    }

    /// Build from an already assembled provisioning context
    pub fn from_provision(provision: Arc<ProvisionContext>, registry: Arc<dyn Registry>) -> Self {
        Self {
            provision,
            registry,
        }
    }

    pub fn provision(&self) -> Arc<ProvisionContext> {
        Arc::clone(&self.provision)
    }

    pub fn config(&self) -> &ProvisionConfig {
        self.provision.config()
    }

    pub fn activity(&self) -> &ActivityLog {
        self.provision.activity()
    }

    /// ログアーティファクトを作成し、タスクに添付する
    pub async fn attach_log_artifact(&self) -> ProvisionResult<Option<PathBuf>> {
        let Some(path) = self.activity().artifact() else {
            return Ok(None);
        };

        ProvisionedFile::new(&path).create("").await?;
        self.registry.attach_artifact(&path).await?;
        tracing::debug!(path = %path.display(), "attached log artifact");
        Ok(Some(path))
    }

    pub async fn application(&self, id: u64) -> ProvisionResult<Application> {
        self.registry.application(id).await
    }

    /// 対象アプリケーションのリポジトリに対するSCMドライバを作成
    pub async fn open_scm(&self, target: &RepositoryTarget) -> ProvisionResult<Box<dyn Scm>> {
        let application = self.application(target.application_id).await?;
        let mut repository = application.repository.ok_or_else(|| {
            ProvisionError::soft(format!(
                "Application {} has no repository",
                target.application_id
            ))
        })?;
        if let Some(branch) = target.branch.as_deref().filter(|b| !b.is_empty()) {
            repository.branch = Some(branch.to_string());
        }

        let remote = Remote::new(repository)
            .with_application(target.application_id)
            .with_identities(target.identities.clone());
        ScmFactory::create(self.provision(), &target.dest, remote).await
    }

    /// 実行結果をレポートに変換
    pub fn report<T: Serialize>(&self, result: ProvisionResult<T>) -> TaskReport {
        let detail = result.and_then(|value| serde_json::to_value(value).map_err(Into::into));
        match detail {
            Ok(detail) => TaskReport::success(detail, self.activity().lines()),
            Err(error) => {
                tracing::debug!(error = ?error, "task failed");
                TaskReport::failure(&error, self.activity().lines())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::repository::RepositoryDescriptor;
    use crate::infrastructure::process::ScriptedRunner;
    use crate::infrastructure::registry::InMemoryRegistry;
    use tempfile::TempDir;

    fn task(root: &TempDir, registry: InMemoryRegistry, activity: ActivityLog) -> TaskContext {
        TaskContext::new(
            ProvisionConfig::rooted_at(root.path()),
            Arc::new(registry),
            Arc::new(ScriptedRunner::new()),
            activity,
        )
    }

    #[tokio::test]
    async fn test_application_without_repository_is_soft() {
        let root = TempDir::new().unwrap();
        let registry = InMemoryRegistry::new().with_application(Application {
            id: 4,
            ..Application::default()
        });
        let task = task(&root, registry, ActivityLog::new());

        let error = task
            .open_scm(&RepositoryTarget::new(4, root.path().join("src")))
            .await
            .err()
            .unwrap();
        assert!(error.is_soft());
        assert!(error.to_string().contains("has no repository"));
    }

    #[tokio::test]
    async fn test_branch_override() {
        let root = TempDir::new().unwrap();
        let registry = InMemoryRegistry::new().with_application(Application {
            id: 4,
            repository: Some(
                RepositoryDescriptor::new("git", "https://example.com/app.git").with_branch("main"),
            ),
            ..Application::default()
        });
        let task = task(&root, registry, ActivityLog::new());

        let target = RepositoryTarget::new(4, root.path().join("src")).with_branch("release");
        let scm = task.open_scm(&target).await.unwrap();
        assert_eq!(scm.remote().repository.branch(), Some("release"));
        assert_eq!(scm.remote().application_id, Some(4));
    }

    #[tokio::test]
    async fn test_log_artifact_is_created_and_attached() {
        let root = TempDir::new().unwrap();
        let registry = InMemoryRegistry::new();
        let artifact = root.path().join("task.log");
        let activity = ActivityLog::new().with_artifact(&artifact);
        let provision = Arc::new(ProvisionContext::new(
            ProvisionConfig::rooted_at(root.path()),
            Arc::new(registry.clone()),
            CommandExecutor::new(Arc::new(ScriptedRunner::new()), activity),
        ));
        let task = TaskContext::from_provision(provision, Arc::new(registry.clone()));

        let attached = task.attach_log_artifact().await.unwrap();
        assert_eq!(attached.as_deref(), Some(artifact.as_path()));
        assert!(artifact.exists());
        assert_eq!(registry.attached(), vec![artifact]);
    }

    #[tokio::test]
    async fn test_no_artifact_configured() {
        let root = TempDir::new().unwrap();
        let task = task(&root, InMemoryRegistry::new(), ActivityLog::new());
        assert_eq!(task.attach_log_artifact().await.unwrap(), None);
    }
}
