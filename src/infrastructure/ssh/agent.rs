//! SSH agent and key provisioning
//!
//! The agent socket, askpass script and key files are written once per home
//! directory. Variables the agent needs are exported through the context
//! environment, never the process environment.

use crate::common::error::ProvisionError;
use crate::common::result::ProvisionResult;
use crate::domain::entities::identity::Identity;
use crate::infrastructure::context::ProvisionContext;
use crate::infrastructure::filesystem::file_ops;
use crate::infrastructure::filesystem::ProvisionedFile;
use crate::infrastructure::process::{Command, RunMode};
use std::path::PathBuf;

pub const SSH_AUTH_SOCK: &str = "SSH_AUTH_SOCK";
pub const SSH_ASKPASS: &str = "SSH_ASKPASS";
pub const DISPLAY: &str = "DISPLAY";

/// ssh-agent bound to a provisioning context
pub struct SshAgent<'a> {
    ctx: &'a ProvisionContext,
}

impl<'a> SshAgent<'a> {
    pub fn new(ctx: &'a ProvisionContext) -> Self {
        Self { ctx }
    }

    /// `<tmp>/agent.<pid>`
    pub fn socket_path(&self) -> PathBuf {
        self.ctx
            .config()
            .tmp_dir
            .join(format!("agent.{}", self.ctx.pid()))
    }

    /// `<home>/.ssh/id_<identity id>`
    pub fn key_path(&self, identity: &Identity) -> PathBuf {
        self.ctx.config().ssh_dir().join(format!("id_{}", identity.id))
    }

    pub fn askpass_path(&self) -> PathBuf {
        self.ctx.config().tmp_dir.join("ask.sh")
    }

    /// Start the agent. Later calls on the same context do nothing.
    pub async fn start(&self) -> ProvisionResult<()> {
        if self.ctx.agent_started() {
            return Ok(());
        }

        let socket = self.socket_path();
        let config = self.ctx.config();
        let command = Command::new(&config.programs.ssh_agent)
            .arg("-a")
            .arg(socket.display().to_string());
        self.ctx.run(command, RunMode::Reported).await?;

        self.ctx
            .env()
            .set(SSH_AUTH_SOCK, socket.display().to_string());
        file_ops::make_dir(&config.ssh_dir(), 0o700).await?;

        self.ctx.set_agent_started();
        self.ctx.activity().add("[SSH] Agent started.");
        Ok(())
    }

    /// Add the identity's key to the agent and trust `host`.
    ///
    /// `host` is `name[:port]`; an empty host skips the key scan. An existing
    /// key file is reused as is. `ssh-add` and the scan run until they have
    /// succeeded once on this context, so a failed attempt is retried.
    pub async fn add(&self, identity: &Identity, host: &str) -> ProvisionResult<()> {
        let Some(key) = identity.private_key() else {
            return Ok(());
        };
        self.ctx
            .activity()
            .add(format!("[SSH] Adding key: {}", identity.name));

        let key_path = self.key_path(identity);
        let key_file = ProvisionedFile::new(&key_path).with_mode(0o600);
        if key_file.create(&format!("{}\n", key.trim())).await?.created() {
            self.ctx
                .activity()
                .add(format!("[FILE] Created {}.", key_path.display()));
        }
        if self.ctx.key_added(&key_path) {
            tracing::debug!("key {} already added", key_path.display());
            return Ok(());
        }

        if let Some(passphrase) = identity.passphrase() {
            self.write_askpass(passphrase).await?;
        }

        let config = self.ctx.config();
        let command = Command::new(&config.programs.ssh_add)
            .arg(key_path.display().to_string())
            .with_timeout(config.ssh_add_timeout());
        self.ctx.run(command, RunMode::Reported).await?;

        self.trust_host(host).await?;
        self.ctx.mark_key_added(key_path);
        Ok(())
    }

    async fn write_askpass(&self, passphrase: &str) -> ProvisionResult<()> {
        let path = self.askpass_path();
        let script = format!("#!/bin/sh\necho '{}'\n", passphrase.replace('\'', r"'\''"));
        ProvisionedFile::new(&path)
            .with_mode(0o700)
            .create(&script)
            .await?;

        let env = self.ctx.env();
        env.set(SSH_ASKPASS, path.display().to_string());
        // ssh-add only consults SSH_ASKPASS when a display is set.
        env.set(DISPLAY, "1");
        Ok(())
    }

    async fn trust_host(&self, host: &str) -> ProvisionResult<()> {
        let (name, port) = split_host(host)?;
        if name.is_empty() {
            tracing::debug!("no host to scan");
            return Ok(());
        }

        let config = self.ctx.config();
        let mut command = Command::new(&config.programs.ssh_keyscan);
        if let Some(port) = port {
            command = command.arg("-p").arg(port.to_string());
        }
        let output = self.ctx.run(command.arg(name), RunMode::Reported).await?;

        file_ops::append_file(&config.known_hosts, &output.stdout, 0o600).await?;
        self.ctx
            .activity()
            .add(format!("[FILE] Updated {}.", config.known_hosts.display()));
        Ok(())
    }
}

/// Split `name[:port]`
fn split_host(host: &str) -> ProvisionResult<(&str, Option<u16>)> {
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') => {
            let port = port
                .parse()
                .map_err(|_| ProvisionError::soft(format!("Invalid port in host '{}'", host)))?;
            Ok((name, Some(port)))
        }
        _ => Ok((host, None)),
    }
}
