use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Append-only activity log reported back with the task result.
///
/// Clones share the same buffer. Each line is also emitted through `tracing`
/// under the `activity` target and, when a log artifact is configured,
/// appended to that file with a timestamp. The artifact is opened once, on
/// the first line, and kept open.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    inner: Arc<Mutex<ActivityState>>,
}

#[derive(Debug, Default)]
struct ActivityState {
    lines: Vec<String>,
    artifact: Option<Artifact>,
}

#[derive(Debug)]
struct Artifact {
    path: PathBuf,
    file: ArtifactFile,
}

#[derive(Debug)]
enum ArtifactFile {
    Pending,
    Open(LineWriter<File>),
    /// Opening failed; lines stay in memory only
    Unavailable,
}

impl Artifact {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: ArtifactFile::Pending,
        }
    }

    fn append(&mut self, line: &str) {
        if let ArtifactFile::Pending = self.file {
            self.file = match open_append(&self.path) {
                Ok(file) => ArtifactFile::Open(LineWriter::new(file)),
                Err(e) => {
                    tracing::warn!("Failed to open log artifact {}: {}", self.path.display(), e);
                    ArtifactFile::Unavailable
                }
            };
        }
        if let ArtifactFile::Open(file) = &mut self.file {
            let stamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            if let Err(e) = writeln!(file, "{} {}", stamp, line) {
                tracing::warn!("Failed to append to log artifact {}: {}", self.path.display(), e);
            }
        }
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also stream every line into the given log artifact file.
    pub fn with_artifact(self, path: impl Into<PathBuf>) -> Self {
        self.lock().artifact = Some(Artifact::new(path.into()));
        self
    }

    pub fn artifact(&self) -> Option<PathBuf> {
        self.lock().artifact.as_ref().map(|a| a.path.clone())
    }

    pub fn add(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "activity", "{}", line);

        let mut state = self.lock();
        if let Some(artifact) = state.artifact.as_mut() {
            artifact.append(&line);
        }
        state.lines.push(line);
    }

    /// Record each line of a command's output, prefixed with `> `.
    pub fn add_output(&self, output: &str) {
        for line in output.lines() {
            self.add(format!("> {}", line));
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lock().lines.iter().any(|line| line.contains(needle))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ActivityState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
