use super::remote::{provision_ssh, resolve_source_identity, Remote};
use super::scm_interface::Scm;
use crate::common::result::ProvisionResult;
use crate::domain::entities::identity::Identity;
use crate::domain::value_objects::remote_url::{RemoteForm, RemoteUrl};
use crate::domain::value_objects::scm_type::ScmType;
use crate::infrastructure::context::ProvisionContext;
use crate::infrastructure::credentials::{userinfo, ProxyResolver};
use crate::infrastructure::filesystem::{file_ops, ProvisionedFile};
use crate::infrastructure::process::{Command, RunMode};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Git implementation of SCM operations
pub struct GitScm {
    ctx: Arc<ProvisionContext>,
    path: PathBuf,
    remote: Remote,
}

impl GitScm {
    pub fn new(ctx: Arc<ProvisionContext>, path: impl Into<PathBuf>, remote: Remote) -> Self {
        Self {
            ctx,
            path: path.into(),
            remote,
        }
    }

    fn git(&self) -> Command {
        Command::new(&self.ctx.config().programs.git)
    }

    /// Git command run inside the working tree
    fn git_in_tree(&self) -> Command {
        self.git().with_dir(&self.path)
    }

    pub fn config_path(&self) -> PathBuf {
        self.ctx.config().home_dir.join(".gitconfig")
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.ctx.config().home_dir.join(".git-credentials")
    }

    /// Write `~/.gitconfig` unless it already exists
    async fn write_config(&self, url: &RemoteUrl) -> ProvisionResult<()> {
        let file = ProvisionedFile::new(self.config_path());
        if file.exists().await {
            return Ok(());
        }

        let mut content = String::from("[credential]\nhelper = store\n[http]\n");
        content.push_str(&format!("sslVerify = {}\n", !self.remote.insecure));
        if let Some(proxy) = ProxyResolver::new(self.ctx.registry()).resolve(url).await? {
            self.ctx
                .activity()
                .add(format!("[GIT] Using proxy ({}) {}.", proxy.id, proxy.kind));
            content.push_str(&format!("proxy = {}\n", proxy.url()));
        }

        if file.create(&content).await?.created() {
            self.ctx
                .activity()
                .add(format!("[FILE] Created {}.", file.path().display()));
        }
        Ok(())
    }

    /// Write `~/.git-credentials` for the store helper.
    ///
    /// One line per scheme the helper may be asked about: the remote's own
    /// scheme, then https and http. User and password are percent-encoded.
    async fn write_credentials(&self, url: &RemoteUrl, identity: &Identity) -> ProvisionResult<()> {
        if !identity.has_basic_auth() {
            return Ok(());
        }

        let mut schemes = Vec::new();
        if url.form() == RemoteForm::Url {
            schemes.push(url.scheme());
        }
        schemes.extend(["https", "http"]);

        let encoded = userinfo(&identity.user, &identity.password);
        let content: String = schemes
            .iter()
            .map(|scheme| format!("{}://{}@{}\n", scheme, encoded, url.authority()))
            .collect();

        let file = ProvisionedFile::new(self.credentials_path()).with_mode(0o600);
        if file.create(&content).await?.created() {
            self.ctx
                .activity()
                .add(format!("[FILE] Created {}.", file.path().display()));
        }
        Ok(())
    }

    /// Check out the requested branch after cloning
    async fn checkout(&self) -> ProvisionResult<()> {
        let Some(branch) = self.remote.repository.branch() else {
            return Ok(());
        };
        let command = self.git_in_tree().args(["checkout", branch]);
        self.ctx.run(command, RunMode::Reported).await?;
        Ok(())
    }
}

#[async_trait]
impl Scm for GitScm {
    fn scm_type(&self) -> ScmType {
        ScmType::Git
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn remote(&self) -> &Remote {
        &self.remote
    }

    async fn validate(&self) -> ProvisionResult<()> {
        self.remote.validate(ScmType::Git)
    }

    async fn fetch(&self) -> ProvisionResult<()> {
        let url = self.remote.url()?;
        self.ctx.activity().add(format!("[GIT] Cloning: {}", url));
        file_ops::remove_dir(&self.path).await?;

        let identity =
            resolve_source_identity(&self.ctx, &self.remote, ScmType::Git.activity_tag()).await?;
        self.write_config(&url).await?;
        self.write_credentials(&url, &identity).await?;
        provision_ssh(&self.ctx, &identity, &url.authority()).await?;

        let command = self
            .git()
            .arg("clone")
            .arg(url.as_str())
            .arg(self.path.display().to_string());
        self.ctx.run(command, RunMode::Reported).await?;

        self.checkout().await
    }

    async fn branch(&mut self, name: &str) -> ProvisionResult<()> {
        let checkout = self.git_in_tree().args(["checkout", name]);
        let result = match self.ctx.run(checkout, RunMode::Reported).await {
            Err(e) if e.is_command_failure() => {
                tracing::debug!("branch {} not found, creating it", name);
                let create = self.git_in_tree().args(["checkout", "-b", name]);
                self.ctx.run(create, RunMode::Reported).await.map(|_| ())
            }
            other => other.map(|_| ()),
        };
        self.remote.repository.branch = Some(name.to_string());
        result
    }

    async fn commit(&self, files: &[String], message: &str) -> ProvisionResult<()> {
        if !files.is_empty() {
            let add = self.git_in_tree().arg("add").args(files.iter().cloned());
            self.ctx.run(add, RunMode::Reported).await?;
        }

        let commit = self.git_in_tree().args(["commit", "-m", message]);
        self.ctx.run(commit, RunMode::Reported).await?;

        let upstream = self.remote.repository.branch().unwrap_or("HEAD");
        let push = self
            .git_in_tree()
            .args(["push", "--set-upstream", "origin", upstream]);
        self.ctx.run(push, RunMode::Reported).await?;
        Ok(())
    }
}
