use crate::common::activity::ActivityLog;
use crate::common::error::ProvisionError;
use crate::common::result::ProvisionResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command as TokioCommand};
use tokio::time::timeout;

/// Ordered argument list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(Vec<String>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, option: impl Into<String>) -> &mut Self {
        self.0.push(option.into());
        self
    }

    pub fn add_all<I, S>(&mut self, options: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, option: &str) -> bool {
        self.0.iter().any(|o| o == option)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// A single external program invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    /// Program path
    pub path: String,

    pub options: Options,

    /// Working directory (inherits the current one when unset)
    pub dir: Option<PathBuf>,

    /// Extra environment, applied on top of the inherited one
    pub env: Vec<(String, String)>,

    /// Kill the process and fail with `Cancelled` once this elapses
    pub timeout: Option<Duration>,
}

impl Command {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, option: impl Into<String>) -> Self {
        self.options.add(option);
        self
    }

    pub fn args<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.add_all(options);
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Put `vars` in front of the command's own variables, which keep
    /// precedence.
    pub fn with_base_env(mut self, vars: Vec<(String, String)>) -> Self {
        let own = std::mem::take(&mut self.env);
        self.env = vars;
        self.env.extend(own);
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Last path component of the program, e.g. `git` for `/usr/bin/git`
    pub fn program(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.path)
    }

    pub fn display(&self) -> String {
        let mut line = self.path.clone();
        for option in self.options.iter() {
            line.push(' ');
            line.push_str(option);
        }
        line
    }
}

/// How much of an invocation reaches the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Invocation, outcome and output are all recorded
    Reported,
    /// Only failures are recorded and the argument list never is
    Silent,
}

/// Output of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,

    /// Standard output alone
    pub stdout: String,

    /// Standard output and error interleaved in arrival order
    pub combined: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches external programs.
///
/// A non-zero exit is not an error at this level; it is returned as the
/// output's exit code. Errors are reserved for processes that could not be
/// started or were cancelled.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, command: &Command) -> ProvisionResult<CommandOutput>;
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    async fn wait_for_completion(mut child: Child, program: &str) -> ProvisionResult<CommandOutput> {
        let combined = Mutex::new(String::new());
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout_text, _) = tokio::join!(
            read_stream(stdout, &combined),
            read_stream(stderr, &combined)
        );

        let status = child
            .wait()
            .await
            .map_err(|e| ProvisionError::process_error(program, "failed to wait for process", e))?;

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: stdout_text,
            combined: combined.into_inner().unwrap_or_else(|e| e.into_inner()),
        })
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn execute(&self, command: &Command) -> ProvisionResult<CommandOutput> {
        let mut cmd = TokioCommand::new(&command.path);
        cmd.args(command.options.iter());
        if let Some(dir) = &command.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &command.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ProvisionError::process_error(&command.path, "failed to start", e))?;

        match command.timeout {
            Some(limit) => match timeout(limit, Self::wait_for_completion(child, &command.path)).await
            {
                Ok(result) => result,
                // Dropping the future drops the child, which kills it.
                Err(_) => Err(ProvisionError::cancelled(
                    &command.path,
                    limit.as_millis() as u64,
                )),
            },
            None => Self::wait_for_completion(child, &command.path).await,
        }
    }
}

async fn read_stream<R>(stream: Option<R>, combined: &Mutex<String>) -> String
where
    R: AsyncRead + Unpin,
{
    let mut captured = String::new();
    let Some(stream) = stream else {
        return captured;
    };

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let chunk = String::from_utf8_lossy(&buf);
                captured.push_str(&chunk);
                combined
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push_str(&chunk);
            }
            Err(e) => {
                tracing::warn!("Failed to read process output: {}", e);
                break;
            }
        }
    }
    captured
}

/// Runs commands and records them in the activity log.
///
/// Non-zero exits become [`ProvisionError::CommandFailed`] carrying the
/// combined output.
#[derive(Clone)]
pub struct CommandExecutor {
    runner: Arc<dyn CommandRunner>,
    activity: ActivityLog,
}

impl CommandExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>, activity: ActivityLog) -> Self {
        Self { runner, activity }
    }

    pub fn system(activity: ActivityLog) -> Self {
        Self::new(Arc::new(SystemRunner::new()), activity)
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub async fn run(&self, command: &Command, mode: RunMode) -> ProvisionResult<CommandOutput> {
        let reported = mode == RunMode::Reported;
        if reported {
            self.activity
                .add(format!("[CMD] Running: {}", command.display()));
        }
        tracing::debug!(program = %command.path, ?mode, "running command");

        let output = match self.runner.execute(command).await {
            Ok(output) => output,
            Err(error) => {
                if error.is_cancelled() {
                    self.activity.add(error.to_string());
                } else {
                    self.activity.add(format!("[CMD] {}", error));
                }
                return Err(error);
            }
        };

        if output.success() {
            if reported {
                self.activity.add("[CMD] succeeded.");
                self.activity.add_output(&output.combined);
            }
            return Ok(output);
        }

        let error =
            ProvisionError::command_failed(&command.path, output.exit_code, output.combined.clone());
        self.activity.add(error.to_string());
        self.activity.add_output(&output.combined);
        Err(error)
    }
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::process::scripted::{Reply, ScriptedRunner};
    use tempfile::TempDir;

    fn sh(script: &str) -> Command {
        Command::new("/bin/sh").arg("-c").arg(script)
    }

    #[tokio::test]
    async fn test_simple_command_execution() {
        let output = SystemRunner::new()
            .execute(&sh("echo 'Hello, World!'"))
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "Hello, World!\n");
        assert_eq!(output.combined, "Hello, World!\n");
    }

    #[tokio::test]
    async fn test_combined_output_holds_both_streams() {
        let output = SystemRunner::new()
            .execute(&sh("echo out; echo err 1>&2"))
            .await
            .unwrap();

        assert_eq!(output.stdout, "out\n");
        assert!(output.combined.contains("out\n"));
        assert!(output.combined.contains("err\n"));
    }

    #[tokio::test]
    async fn test_command_with_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let output = SystemRunner::new()
            .execute(&sh("pwd").with_dir(temp_dir.path()))
            .await
            .unwrap();

        let canonical = temp_dir.path().canonicalize().unwrap();
        assert!(output.stdout.contains(canonical.to_str().unwrap()));
    }

    #[tokio::test]
    async fn test_command_with_environment_variables() {
        let output = SystemRunner::new()
            .execute(&sh("echo $SSH_AUTH_SOCK").with_env("SSH_AUTH_SOCK", "/tmp/agent.42"))
            .await
            .unwrap();

        assert_eq!(output.stdout.trim(), "/tmp/agent.42");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_a_runner_error() {
        let output = SystemRunner::new().execute(&sh("exit 3")).await.unwrap();
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let command = sh("sleep 5").with_timeout(Duration::from_millis(200));
        let error = SystemRunner::new().execute(&command).await.unwrap_err();

        assert!(error.is_cancelled());
        assert!(matches!(
            error,
            ProvisionError::Cancelled { timeout_ms: 200, .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_wrapped_error() {
        let error = SystemRunner::new()
            .execute(&Command::new("/nonexistent/bin/tool"))
            .await
            .unwrap_err();

        assert!(!error.is_soft());
        assert!(matches!(error, ProvisionError::Process { .. }));
        assert_eq!(
            error.context(),
            vec![("command", "/nonexistent/bin/tool".to_string())]
        );
    }

    #[tokio::test]
    async fn test_reported_mode_records_everything() {
        let runner = ScriptedRunner::new().with_reply("git", Reply::stdout("Cloning into 'app'...\n"));
        let activity = ActivityLog::new();
        let executor = CommandExecutor::new(Arc::new(runner), activity.clone());

        let command = Command::new("/usr/bin/git").args(["clone", "https://example.com/app.git"]);
        executor.run(&command, RunMode::Reported).await.unwrap();

        assert_eq!(
            activity.lines(),
            vec![
                "[CMD] Running: /usr/bin/git clone https://example.com/app.git",
                "[CMD] succeeded.",
                "> Cloning into 'app'...",
            ]
        );
    }

    #[tokio::test]
    async fn test_silent_mode_hides_arguments() {
        let runner = ScriptedRunner::new().with_reply("svn", Reply::fail(1, "E170013: unable to connect\n"));
        let activity = ActivityLog::new();
        let executor = CommandExecutor::new(Arc::new(runner), activity.clone());

        let command = Command::new("/usr/bin/svn").args(["--password", "s3cret", "info"]);
        let error = executor.run(&command, RunMode::Silent).await.unwrap_err();

        assert!(error.is_command_failure());
        assert_eq!(error.output(), Some("E170013: unable to connect\n"));
        assert!(!activity.contains("s3cret"));
        assert_eq!(
            activity.lines(),
            vec![
                "[CMD] /usr/bin/svn failed: exit status 1.",
                "> E170013: unable to connect",
            ]
        );
    }

    #[tokio::test]
    async fn test_silent_success_records_nothing() {
        let activity = ActivityLog::new();
        let executor = CommandExecutor::new(Arc::new(ScriptedRunner::new()), activity.clone());

        executor
            .run(&Command::new("/usr/bin/svn").arg("info"), RunMode::Silent)
            .await
            .unwrap();

        assert!(activity.lines().is_empty());
    }

    #[test]
    fn test_command_display_and_program() {
        let command = Command::new("/usr/bin/git").args(["checkout", "-b", "feature"]);
        assert_eq!(command.display(), "/usr/bin/git checkout -b feature");
        assert_eq!(command.program(), "git");
        assert_eq!(Command::new("mvn").program(), "mvn");
    }

    #[test]
    fn test_base_env_keeps_command_precedence() {
        let command = Command::new("ssh-add")
            .with_env("DISPLAY", ":0")
            .with_base_env(vec![("DISPLAY".to_string(), "1".to_string())]);
        assert_eq!(
            command.env,
            vec![
                ("DISPLAY".to_string(), "1".to_string()),
                ("DISPLAY".to_string(), ":0".to_string()),
            ]
        );
    }
}
