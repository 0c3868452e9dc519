use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::path::canonicalise;
use crate::service::{ChangeKind, FileChangeService, WatchCookie, WatchError};

/// Caller-supplied identifier linking a watched file back to a logical
/// project item. Items without an identity are observed with `None`.
pub type ItemId = u32;

/// Raised to subscribers when a watched file changes on disk.
// Serialize/Deserialize are required for persisting
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileChangedEvent {
    /// Canonical form of the path that changed.
    pub path: PathBuf,
    pub item_id: Option<ItemId>,
    pub kind: ChangeKind,
}

/// Bookkeeping for one watched path. Replaced wholesale on write, never
/// mutated in place.
#[derive(Debug, Clone, Copy)]
struct ObservedItem {
    item_id: Option<ItemId>,
    cookie: WatchCookie,
}

const WATCHED_KINDS: &[ChangeKind] = &[ChangeKind::Modified, ChangeKind::Deleted];

/// Tracks filesystem-change subscriptions for a set of watched paths and
/// re-dispatches the service's raw notifications as [`FileChangedEvent`]s.
///
/// At most one subscription exists per canonicalised path; observing an
/// already-watched path keeps the original subscription and item id.
/// Notifications for paths the registry does not (or no longer) track are
/// dropped.
pub struct FileWatchRegistry {
    service: Arc<dyn FileChangeService>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    observed: HashMap<PathBuf, ObservedItem>,
    subscribers: Vec<crossbeam_channel::Sender<FileChangedEvent>>,
    disposed: bool,
}

impl FileWatchRegistry {
    pub fn new(service: Arc<dyn FileChangeService>) -> Self {
        Self {
            service,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Receive a [`FileChangedEvent`] for every change to a watched path.
    /// Events are delivered to subscribers in registration order.
    pub fn subscribe(&self) -> crossbeam_channel::Receiver<FileChangedEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.inner.lock().unwrap().subscribers.push(tx);
        rx
    }

    /// Observe changes to `file_name` on disk, without linking the file to a
    /// project item.
    #[tracing::instrument(skip(self))]
    pub fn observe_item(&self, file_name: &Path) -> Result<(), WatchError> {
        self.observe(file_name, None)
    }

    /// Observe changes to `file_name` on disk on behalf of the item `id`.
    #[tracing::instrument(skip(self))]
    pub fn observe_item_with_id(&self, file_name: &Path, id: ItemId) -> Result<(), WatchError> {
        self.observe(file_name, Some(id))
    }

    fn observe(&self, file_name: &Path, id: Option<ItemId>) -> Result<(), WatchError> {
        if file_name.as_os_str().is_empty() {
            return Err(WatchError::EmptyPath);
        }

        let full_file_name = canonicalise(file_name);
        if self
            .inner
            .lock()
            .unwrap()
            .observed
            .contains_key(&full_file_name)
        {
            tracing::trace!(path = %full_file_name.display(), "already observed");
            return Ok(());
        }

        // The advise call happens outside the lock: the service may deliver
        // a notification synchronously from inside it.
        let cookie = self
            .service
            .advise_file_change(&full_file_name, WATCHED_KINDS)?;
        tracing::debug!(path = %full_file_name.display(), cookie, "observing file");

        let mut inner = self.inner.lock().unwrap();
        match inner.observed.entry(full_file_name) {
            Entry::Vacant(entry) => {
                entry.insert(ObservedItem {
                    item_id: id,
                    cookie,
                });
                Ok(())
            }
            Entry::Occupied(_) => {
                // Another observe of the same path won the race; the earlier
                // subscription stays.
                drop(inner);
                self.service.unadvise_file_change(cookie)
            }
        }
    }

    /// Ask the watch service to suppress (or stop suppressing) notifications
    /// for an already-watched file. No-op for paths not currently watched.
    #[tracing::instrument(skip(self))]
    pub fn ignore_item_changes(&self, file_name: &Path, ignore: bool) -> Result<(), WatchError> {
        if file_name.as_os_str().is_empty() {
            return Err(WatchError::EmptyPath);
        }

        let full_file_name = canonicalise(file_name);
        let watched = self
            .inner
            .lock()
            .unwrap()
            .observed
            .contains_key(&full_file_name);
        if watched {
            self.service.ignore_file(&full_file_name, ignore)?;
        }
        Ok(())
    }

    /// Stop observing changes to `file_name`. No-op for paths not currently
    /// watched.
    #[tracing::instrument(skip(self))]
    pub fn stop_observing_item(&self, file_name: &Path) -> Result<(), WatchError> {
        if file_name.as_os_str().is_empty() {
            return Err(WatchError::EmptyPath);
        }

        let full_file_name = canonicalise(file_name);

        // The entry leaves the map before the unadvise call: the service may
        // re-enter `files_changed` synchronously from inside
        // `unadvise_file_change`, and that notification must already find the
        // path unobserved.
        let removed = self.inner.lock().unwrap().observed.remove(&full_file_name);
        match removed {
            Some(item) => {
                tracing::debug!(path = %full_file_name.display(), cookie = item.cookie, "released watch");
                self.service.unadvise_file_change(item.cookie)
            }
            None => Ok(()),
        }
    }

    /// Inbound notification from the watch service: the files in `files`
    /// changed on disk, with `flags[i]` describing the change to `files[i]`.
    ///
    /// Paths the registry does not track are dropped without an event; that
    /// covers both paths watched by other consumers and late notifications
    /// for paths already unobserved.
    #[tracing::instrument(skip(self, files, flags))]
    pub fn files_changed(&self, files: &[PathBuf], flags: &[ChangeKind]) -> Result<(), WatchError> {
        if files.len() != flags.len() {
            return Err(WatchError::MismatchedNotification {
                paths: files.len(),
                flags: flags.len(),
            });
        }

        for (file, kind) in files.iter().zip(flags) {
            let full_file_name = canonicalise(file);

            let mut inner = self.inner.lock().unwrap();
            let Some(item) = inner.observed.get(&full_file_name).copied() else {
                tracing::trace!(path = %full_file_name.display(), "ignoring notification for unobserved path");
                continue;
            };

            let event = FileChangedEvent {
                path: full_file_name,
                item_id: item.item_id,
                kind: *kind,
            };
            tracing::debug!(path = %event.path.display(), kind = ?event.kind, "file changed on disk");
            inner
                .subscribers
                .retain(|tx| tx.send(event.clone()).is_ok());
        }

        Ok(())
    }

    /// Inbound notification from the watch service for a directory-level
    /// change. Accepted, but directory granularity is not modelled: no event
    /// is produced.
    pub fn directory_changed(&self, directory: &Path) {
        tracing::trace!(directory = %directory.display(), "ignoring directory change");
    }

    /// Release every remaining subscription and clear the registry.
    /// Idempotent: second and later calls are no-ops.
    #[tracing::instrument(skip(self))]
    pub fn dispose(&self) -> Result<(), WatchError> {
        let drained: Vec<ObservedItem> = {
            let mut inner = self.inner.lock().unwrap();
            if inner.disposed {
                return Ok(());
            }
            inner.disposed = true;
            inner.observed.drain().map(|(_, item)| item).collect()
        };

        let mut outcome = Ok(());
        for item in drained {
            if let Err(error) = self.service.unadvise_file_change(item.cookie) {
                tracing::warn!(%error, cookie = item.cookie, "failed to release watch subscription");
                if outcome.is_ok() {
                    outcome = Err(error);
                }
            }
        }
        outcome
    }
}

impl Drop for FileWatchRegistry {
    fn drop(&mut self) {
        if let Err(error) = self.dispose() {
            tracing::warn!(%error, "error releasing watch subscriptions on drop");
        }
    }
}
