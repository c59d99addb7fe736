use super::settings::MavenSettings;
use crate::common::error::ProvisionError;
use crate::common::result::{IoResultExt, ProvisionResult};
use crate::domain::entities::identity::Identity;
use crate::domain::entities::repository::Application;
use crate::infrastructure::context::ProvisionContext;
use crate::infrastructure::credentials::{CredentialResolver, ProxyResolver};
use crate::infrastructure::filesystem::{file_ops, ProvisionedFile};
use crate::infrastructure::process::{Command, CommandOutput, Options, RunMode};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const INSECURE_SETTING: &str = "mvn.insecure.enabled";

const REMOVE_PROJECT_ARTIFACT: &str =
    "org.codehaus.mojo:build-helper-maven-plugin:3.3.0:remove-project-artifact";

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static PROFILES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<profiles\s*>.*?</profiles>").expect("valid regex"));
static PROJECT_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<project(?:\s[^>]*)?>").expect("valid regex"));
static MODULES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<modules\s*>(.*?)</modules>").expect("valid regex"));
static MODULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<module\s*>").expect("valid regex"));

/// Maven build tool driver
pub struct Maven {
    ctx: Arc<ProvisionContext>,
    application: Application,
    bin_dir: PathBuf,
    m2_dir: PathBuf,
}

impl Maven {
    pub fn new(
        ctx: Arc<ProvisionContext>,
        application: Application,
        bin_dir: impl Into<PathBuf>,
        m2_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ctx,
            application,
            bin_dir: bin_dir.into(),
            m2_dir: m2_dir.into(),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.ctx.config().work_dir.join("settings.xml")
    }

    /// Fetch dependencies listed in the POM
    pub async fn fetch(&self, source_dir: &Path) -> ProvisionResult<()> {
        self.ctx.activity().add("[MVN] Fetch dependencies.");
        let mut options = Options::new();
        options.add("dependency:copy-dependencies").add("-f").add(pom(source_dir));
        self.run(options).await.map(|_| ())
    }

    /// Fetch the application's binary artifact
    pub async fn fetch_artifact(&self) -> ProvisionResult<()> {
        let artifact = self
            .application
            .binary
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                ProvisionError::soft(format!(
                    "Application {} has no binary artifact",
                    self.application.id
                ))
            })?;
        self.ctx
            .activity()
            .add(format!("[MVN] Fetch artifact {}.", artifact));

        let mut options = Options::new();
        options
            .add("dependency:copy")
            .add(format!("-Dartifact={}", artifact))
            .add("-Dmdep.useBaseVersion=true");
        self.run(options).await.map(|_| ())
    }

    /// Install the application's artifacts into the local repository
    pub async fn install_artifacts(&self, source_dir: &Path) -> ProvisionResult<()> {
        self.ctx.activity().add("[MVN] Install application.");
        let mut options = Options::new();
        options
            .add("install")
            .add("-DskipTests")
            .add("-f")
            .add(pom(source_dir));
        self.run(options).await.map(|_| ())
    }

    /// Remove the application's artifacts from the local repository
    pub async fn delete_artifacts(&self, source_dir: &Path) -> ProvisionResult<()> {
        self.ctx
            .activity()
            .add("[MVN] Delete application artifacts.");
        let mut options = Options::new();
        options.add(REMOVE_PROJECT_ARTIFACT).add("-f").add(pom(source_dir));
        self.run(options).await.map(|_| ())
    }

    /// Whether the POM declares modules
    pub async fn has_modules(&self, source_dir: &Path) -> ProvisionResult<bool> {
        let path = source_dir.join("pom.xml");
        let xml = tokio::fs::read_to_string(&path)
            .await
            .with_path("Failed to read POM", &path)?;
        pom_has_modules(&xml).ok_or_else(|| {
            ProvisionError::config_error("POM has no <project> root element", Some(path))
        })
    }

    /// Write `settings.xml` unless it already exists
    pub async fn write_settings(&self) -> ProvisionResult<PathBuf> {
        let file = ProvisionedFile::new(self.settings_path());
        if file.exists().await {
            return Ok(file.path().to_path_buf());
        }

        let resolver = CredentialResolver::new(self.ctx.registry());
        let identity = resolver
            .for_application(
                Some(self.application.id),
                &self.application.identities,
                Identity::MAVEN,
            )
            .await?;

        let mut settings = match identity {
            Some(identity) => {
                self.ctx.activity().add(format!(
                    "[MVN] Using credentials (id={}) {}.",
                    identity.id, identity.name
                ));
                match identity.settings.as_deref().filter(|s| !s.trim().is_empty()) {
                    Some(xml) => MavenSettings::parse(xml).map_err(|e| {
                        ProvisionError::config_error_with_source(
                            format!("Invalid settings in identity {}", identity.id),
                            Some(file.path().to_path_buf()),
                            e,
                        )
                    })?,
                    None => MavenSettings::empty(),
                }
            }
            None => MavenSettings::empty(),
        };

        let proxies = ProxyResolver::new(self.ctx.registry()).enabled().await?;
        for proxy in &proxies {
            self.ctx
                .activity()
                .add(format!("[MVN] Using proxy ({}) {}.", proxy.id, proxy.kind));
        }
        settings.inject_proxies(&proxies);
        settings.set_local_repository(&self.m2_dir);

        if file.create(settings.as_str()).await?.created() {
            self.ctx
                .activity()
                .add(format!("[FILE] Created {}.", file.path().display()));
        }
        Ok(file.path().to_path_buf())
    }

    async fn run(&self, mut options: Options) -> ProvisionResult<CommandOutput> {
        let settings = self.write_settings().await?;
        let insecure = self.ctx.setting(INSECURE_SETTING).await?;
        file_ops::make_dir(&self.bin_dir, 0o755).await?;

        options
            .add(format!("-DoutputDirectory={}", self.bin_dir.display()))
            .add(format!("-Dmaven.repo.local={}", self.m2_dir.display()));
        if insecure {
            options.add("-Dmaven.wagon.http.ssl.insecure=true");
        }
        options.add("-s").add(settings.display().to_string());

        let command = Command::new(&self.ctx.config().programs.mvn).with_options(options);
        self.ctx.run(command, RunMode::Reported).await
    }
}

fn pom(source_dir: &Path) -> String {
    source_dir.join("pom.xml").display().to_string()
}

/// `None` when the document has no `<project>` root
fn pom_has_modules(xml: &str) -> Option<bool> {
    let xml = COMMENT.replace_all(xml, "");
    if !PROJECT_OPEN.is_match(&xml) {
        return None;
    }
    // Modules declared only inside a profile do not count.
    let xml = PROFILES.replace_all(&xml, "");
    let found = MODULES
        .captures_iter(&xml)
        .any(|captures| MODULE.is_match(&captures[1]));
    Some(found)
}
