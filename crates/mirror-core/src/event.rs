//! Log events emitted by comparison and execution

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// What a [`LogEvent`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    CreateDir,
    CopyNew,
    UpdateModified,
    DeleteFile,
    DeleteEmptyDir,
    Warning,
    Error,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateDir => "create-dir",
            Self::CopyNew => "copy-new",
            Self::UpdateModified => "update-modified",
            Self::DeleteFile => "delete-file",
            Self::DeleteEmptyDir => "delete-empty-dir",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// True for kinds that record a filesystem mutation.
    pub fn is_action(self) -> bool {
        !matches!(self, Self::Warning | Self::Error)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the ordered event stream of a run.
///
/// Events are immutable once created; consumers only read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    timestamp: DateTime<Utc>,
    kind: EventKind,
    paths: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl LogEvent {
    /// An action on one path.
    pub fn action(kind: EventKind, path: impl Into<PathBuf>) -> Self {
        Self::new(kind, vec![path.into()], None)
    }

    /// An action with a source and a destination path.
    pub fn transfer(kind: EventKind, from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self::new(kind, vec![from.into(), to.into()], None)
    }

    pub fn warning(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(EventKind::Warning, vec![path.into()], Some(message.into()))
    }

    pub fn error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(EventKind::Error, vec![path.into()], Some(message.into()))
    }

    fn new(kind: EventKind, paths: Vec<PathBuf>, message: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            paths,
            message,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// The last path of the event, which is the affected replica path for
    /// transfers.
    pub fn target(&self) -> Option<&Path> {
        self.paths.last().map(PathBuf::as_path)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Forward this event to `tracing` at a level matching its kind.
    pub fn trace(&self) {
        let paths = self.joined_paths();
        match self.kind {
            EventKind::Error => tracing::error!(
                kind = %self.kind,
                paths = %paths,
                cause = self.message.as_deref().unwrap_or_default(),
                "sync operation failed"
            ),
            EventKind::Warning => tracing::warn!(
                kind = %self.kind,
                paths = %paths,
                reason = self.message.as_deref().unwrap_or_default(),
                "sync warning"
            ),
            _ => tracing::info!(kind = %self.kind, paths = %paths, "sync action"),
        }
    }

    fn joined_paths(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.kind,
            self.joined_paths()
        )?;
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}

/// Ordered collector that traces every event as it is recorded.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<LogEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: LogEvent) {
        event.trace();
        self.events.push(event);
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<LogEvent> {
        self.events
    }
}
