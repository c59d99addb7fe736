use super::remote::{provision_ssh, resolve_source_identity, Remote};
use super::scm_interface::Scm;
use crate::common::error::ProvisionError;
use crate::common::result::{IoResultExt, ProvisionResult};
use crate::domain::entities::identity::Identity;
use crate::domain::value_objects::remote_url::RemoteUrl;
use crate::domain::value_objects::scm_type::ScmType;
use crate::infrastructure::context::ProvisionContext;
use crate::infrastructure::credentials::ProxyResolver;
use crate::infrastructure::filesystem::{file_ops, ProvisionedFile};
use crate::infrastructure::process::{Command, RunMode};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Subversion implementation of SCM operations
pub struct SvnScm {
    ctx: Arc<ProvisionContext>,
    path: PathBuf,
    remote: Remote,
}

impl SvnScm {
    pub fn new(ctx: Arc<ProvisionContext>, path: impl Into<PathBuf>, remote: Remote) -> Self {
        Self {
            ctx,
            path: path.into(),
            remote,
        }
    }

    /// Remote URL with the branch (or `trunk`) appended
    pub fn checkout_url(&self) -> ProvisionResult<RemoteUrl> {
        let branch = self.remote.repository.branch().unwrap_or("trunk");
        Ok(self.remote.url()?.join_segment(branch))
    }

    pub fn servers_path(&self) -> PathBuf {
        self.ctx.config().subversion_dir().join("servers")
    }

    pub fn auth_cache_dir(&self) -> PathBuf {
        self.ctx
            .config()
            .subversion_dir()
            .join("auth")
            .join("svn.simple")
    }

    /// `svn --non-interactive [--trust-server-cert]`
    fn svn(&self) -> Command {
        let mut command =
            Command::new(&self.ctx.config().programs.svn).arg("--non-interactive");
        if self.remote.insecure {
            command = command.arg("--trust-server-cert");
        }
        command
    }

    /// Write `~/.subversion/servers` unless it already exists
    async fn write_config(&self, url: &RemoteUrl) -> ProvisionResult<()> {
        let file = ProvisionedFile::new(self.servers_path());
        if file.exists().await {
            return Ok(());
        }

        let mut content = String::new();
        if let Some(proxy) = ProxyResolver::new(self.ctx.registry()).resolve(url).await? {
            self.ctx
                .activity()
                .add(format!("[SVN] Using proxy ({}) {}.", proxy.id, proxy.kind));
            content = proxy.svn_global();
        }

        if file.create(&content).await?.created() {
            self.ctx
                .activity()
                .add(format!("[FILE] Created {}.", file.path().display()));
        }
        Ok(())
    }

    /// Store the password in the client's auth cache.
    ///
    /// A throwaway `svn info` makes the client create its cache entry; the
    /// credential record is then prepended to that entry.
    async fn write_password(&self, url: &RemoteUrl, identity: &Identity) -> ProvisionResult<()> {
        if !identity.has_basic_auth() {
            return Ok(());
        }

        let info = self
            .svn()
            .args(["--username", identity.user.as_str()])
            .args(["--password", identity.password.as_str()])
            .args(["info", url.as_str()]);
        self.ctx.run(info, RunMode::Silent).await?;

        let path = self.auth_cache_entry().await?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_path("Failed to read auth cache", &path)?;
        if has_password(&content) {
            tracing::debug!("{} already holds a password", path.display());
            return Ok(());
        }

        let patched = format!("{}{}", credential_record(identity), content);
        tokio::fs::write(&path, patched)
            .await
            .with_path("Failed to write auth cache", &path)?;
        self.ctx
            .activity()
            .add(format!("[FILE] Updated {}.", path.display()));
        Ok(())
    }

    /// The cache entry left by `svn info`
    async fn auth_cache_entry(&self) -> ProvisionResult<PathBuf> {
        let dir = self.auth_cache_dir();
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_path("Failed to read auth cache", &dir)?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_path("Failed to read auth cache", &dir)?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                files.push(entry.path());
            }
        }
        files.sort();

        match files.len() {
            0 => Err(ProvisionError::filesystem_error(
                "No entry in auth cache",
                Some(dir),
            )),
            1 => Ok(files.remove(0)),
            n => {
                tracing::warn!(
                    "{} entries in {}, patching {}",
                    n,
                    dir.display(),
                    files[0].display()
                );
                Ok(files.remove(0))
            }
        }
    }
}

/// Key/length/value record holding the user and password
fn credential_record(identity: &Identity) -> String {
    let mut record = String::new();
    record.push_str("K 8\npasstype\nV 6\nsimple\n");
    record.push_str("K 8\nusername\n");
    record.push_str(&format!("V {}\n{}\n", identity.user.len(), identity.user));
    record.push_str("K 8\npassword\n");
    record.push_str(&format!(
        "V {}\n{}\n",
        identity.password.len(),
        identity.password
    ));
    record
}

fn has_password(content: &str) -> bool {
    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        if line == "K 8" && lines.next() == Some("password") {
            return true;
        }
    }
    false
}

#[async_trait]
impl Scm for SvnScm {
    fn scm_type(&self) -> ScmType {
        ScmType::Svn
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn remote(&self) -> &Remote {
        &self.remote
    }

    async fn validate(&self) -> ProvisionResult<()> {
        self.remote.validate(ScmType::Svn)
    }

    async fn fetch(&self) -> ProvisionResult<()> {
        let url = self.checkout_url()?;
        file_ops::remove_dir(&self.path).await?;
        self.ctx.activity().add(format!("[SVN] Cloning: {}", url));

        let identity =
            resolve_source_identity(&self.ctx, &self.remote, ScmType::Svn.activity_tag()).await?;
        self.write_config(&url).await?;
        self.write_password(&url, &identity).await?;
        provision_ssh(&self.ctx, &identity, &url.authority()).await?;

        let checkout = self
            .svn()
            .arg("checkout")
            .arg(url.as_str())
            .arg(self.path.display().to_string());
        self.ctx.run(checkout, RunMode::Reported).await?;
        Ok(())
    }

    async fn branch(&mut self, _name: &str) -> ProvisionResult<()> {
        Err(ProvisionError::unsupported_operation(ScmType::Svn, "branch"))
    }

    async fn commit(&self, _files: &[String], _message: &str) -> ProvisionResult<()> {
        Err(ProvisionError::unsupported_operation(ScmType::Svn, "commit"))
    }
}
