use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Identifies a single frame within a paused call stack. Frame 0 is the
/// currently executing frame, 1 is the caller of the currently executing
/// frame, and so on.
pub type FrameId = u64;

pub type ThreadId = u64;

// Serialize/Deserialize are required for persisting
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationResult {
    /// The expression (or variable name) that produced this value.
    pub expression: String,

    /// Display rendering of the value as reported by the debuggee.
    pub value: String,

    /// Runtime type of the value, when the debuggee reports one.
    pub type_name: Option<String>,
}

/// A script loaded in the debuggee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: u64,
    path: PathBuf,
}

impl Module {
    pub fn new(id: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Full path of the script backing this module.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Short display name: the final component of the path.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}
