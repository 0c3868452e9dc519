use std::path::Path;

use serde::{Deserialize, Serialize};

/// Opaque token identifying one active watch request with the external watch
/// service.
pub type WatchCookie = u64;

/// The kind of change the watch service reports for a file.
// Serialize/Deserialize are required for persisting
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Modified,
    Deleted,
    Added,
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Programmer error: the caller passed an empty file name.
    #[error("file name must not be empty")]
    EmptyPath,

    /// Programmer error: a change notification carried arrays of different
    /// lengths.
    #[error("notification arrays disagree: {paths} paths but {flags} flags")]
    MismatchedNotification { paths: usize, flags: usize },

    /// The external watch service failed; carries the service's status code.
    #[error("watch service call failed with status {status}: {message}")]
    Service { status: i32, message: String },
}

/// External filesystem watch service.
///
/// [`FileWatchRegistry`](crate::FileWatchRegistry) subscribes and
/// unsubscribes through this trait and receives raw notifications back via
/// [`FileWatchRegistry::files_changed`](crate::FileWatchRegistry::files_changed).
/// Implementations may deliver notifications synchronously from inside
/// `advise_file_change` and `unadvise_file_change`.
pub trait FileChangeService: Send + Sync {
    /// Begin watching `path` for the given change kinds, returning the
    /// cookie that later releases the subscription.
    fn advise_file_change(
        &self,
        path: &Path,
        kinds: &[ChangeKind],
    ) -> Result<WatchCookie, WatchError>;

    /// Release the subscription identified by `cookie`.
    fn unadvise_file_change(&self, cookie: WatchCookie) -> Result<(), WatchError>;

    /// Suppress (or stop suppressing) notifications for `path`.
    fn ignore_file(&self, path: &Path, ignore: bool) -> Result<(), WatchError>;
}
