//! Scripted command runner for testing
//!
//! Answers commands from a per-program script instead of spawning anything,
//! so the SCM and Maven flows can be exercised without git, svn or mvn
//! installed.

use super::command_executor::{Command, CommandOutput, CommandRunner};
use crate::common::error::ProvisionError;
use crate::common::result::ProvisionResult;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted answer to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    /// Never finishes; the command's timeout turns it into `Cancelled`
    Hang,
}

impl Reply {
    pub fn ok() -> Self {
        Self::stdout("")
    }

    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self::Exit {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn fail(code: i32, stderr: impl Into<String>) -> Self {
        Self::Exit {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

type Handler = Arc<dyn Fn(&Command) -> Reply + Send + Sync>;

struct Rule {
    program: String,
    option: Option<String>,
    handler: Handler,
}

/// Command runner that records every command and answers from a script.
///
/// Rules match on the program's file name and, optionally, on one option
/// being present. The most recently added matching rule wins; unmatched
/// commands exit 0 with no output.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    rules: Arc<Mutex<Vec<Rule>>>,
    calls: Arc<Mutex<Vec<Command>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, program: &str, reply: Reply) -> Self {
        self.with_handler(program, None, move |_| reply.clone())
    }

    /// Reply only when `option` is among the command's options
    pub fn with_reply_to(self, program: &str, option: &str, reply: Reply) -> Self {
        self.with_handler(program, Some(option), move |_| reply.clone())
    }

    /// Compute the reply from the command, e.g. to create the files the
    /// real program would leave behind.
    pub fn with_handler<F>(self, program: &str, option: Option<&str>, handler: F) -> Self
    where
        F: Fn(&Command) -> Reply + Send + Sync + 'static,
    {
        self.push(program, option.map(str::to_string), Arc::new(handler));
        self
    }

    fn push(&self, program: &str, option: Option<String>, handler: Handler) {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Rule {
                program: program.to_string(),
                option,
                handler,
            });
    }

    /// Get all recorded commands
    pub fn calls(&self) -> Vec<Command> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded commands for one program
    pub fn calls_to(&self, program: &str) -> Vec<Command> {
        self.calls()
            .into_iter()
            .filter(|c| c.program() == program)
            .collect()
    }

    /// Recorded commands rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(Command::display).collect()
    }

    fn handler_for(&self, command: &Command) -> Option<Handler> {
        let rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
        rules
            .iter()
            .rev()
            .find(|rule| {
                rule.program == command.program()
                    && rule
                        .option
                        .as_deref()
                        .map_or(true, |option| command.options.contains(option))
            })
            .map(|rule| Arc::clone(&rule.handler))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn execute(&self, command: &Command) -> ProvisionResult<CommandOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(command.clone());

        let reply = match self.handler_for(command) {
            Some(handler) => handler(command),
            None => Reply::ok(),
        };

        match reply {
            Reply::Exit {
                code,
                stdout,
                stderr,
            } => Ok(CommandOutput {
                exit_code: code,
                combined: format!("{}{}", stdout, stderr),
                stdout,
            }),
            Reply::Hang => match command.timeout {
                Some(limit) => {
                    tokio::time::sleep(limit).await;
                    Err(ProvisionError::cancelled(
                        &command.path,
                        limit.as_millis() as u64,
                    ))
                }
                None => std::future::pending().await,
            },
        }
    }
}
