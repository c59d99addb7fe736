use crate::domain::value_objects::scm_type::ScmType;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching repositories and provisioning credentials.
///
/// Variants fall into two classes. User-facing errors ([`is_soft`]) carry a
/// readable reason and are reported to the end user as-is. Wrapped errors
/// describe environment problems or defects and carry key/value context
/// ([`context`]) such as the offending path.
///
/// [`is_soft`]: ProvisionError::is_soft
/// [`context`]: ProvisionError::context
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("{reason}")]
    Soft { reason: String },

    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("http URL used with {setting} = FALSE")]
    InsecureTransport { setting: String },

    #[error("[CMD] {program} failed: exit status {exit_code}.")]
    CommandFailed {
        program: String,
        exit_code: i32,
        output: String,
    },

    #[error("Unsupported operation for {scm_type}: {operation}")]
    UnsupportedOperation { scm_type: ScmType, operation: String },

    #[error("[CMD] {program} cancelled after {timeout_ms} ms")]
    Cancelled { program: String, timeout_ms: u64 },

    #[error("Failed to run {program}: {message}")]
    Process {
        program: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File system operation failed: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Registry error: {message}")]
    Registry {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ProvisionError {
    pub fn soft(reason: impl Into<String>) -> Self {
        Self::Soft {
            reason: reason.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn insecure_transport(setting: impl Into<String>) -> Self {
        Self::InsecureTransport {
            setting: setting.into(),
        }
    }

    pub fn command_failed(
        program: impl Into<String>,
        exit_code: i32,
        output: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            program: program.into(),
            exit_code,
            output: output.into(),
        }
    }

    pub fn unsupported_operation(scm_type: ScmType, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            scm_type,
            operation: operation.into(),
        }
    }

    pub fn cancelled(program: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Cancelled {
            program: program.into(),
            timeout_ms,
        }
    }

    pub fn process_error(
        program: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Process {
            program: program.into(),
            message: message.into(),
            source,
        }
    }

    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystem {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn config_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            path,
            source: Some(Box::new(source)),
        }
    }

    pub fn registry_error(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
            source: None,
        }
    }

    pub fn serialization_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for errors meant to be shown to the end user without diagnostics.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::Soft { .. }
                | Self::InvalidUrl { .. }
                | Self::InsecureTransport { .. }
                | Self::CommandFailed { .. }
                | Self::UnsupportedOperation { .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// True when an external program ran and exited non-zero.
    pub fn is_command_failure(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }

    /// Output captured from a failed command, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Diagnostic key/value pairs for wrapped errors.
    pub fn context(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Process { program, .. } => vec![("command", program.clone())],
            Self::Cancelled { program, .. } => vec![("command", program.clone())],
            Self::FileSystem {
                path: Some(path), ..
            }
            | Self::Config {
                path: Some(path), ..
            } => vec![("path", path.display().to_string())],
            _ => Vec::new(),
        }
    }
}

impl From<std::io::Error> for ProvisionError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<serde_yaml::Error> for ProvisionError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_error_with_source("YAML serialization failed", error)
    }
}

impl From<serde_json::Error> for ProvisionError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_error_with_source("JSON serialization failed", error)
    }
}
