//! Registry of filesystem-change subscriptions keyed by logical project
//! item.
//!
//! The registry sits between an external watch service and the project
//! system: it owns the mapping from canonicalised file path to (item id,
//! subscription cookie), filters inbound change notifications down to the
//! paths it still tracks, and re-emits them as [`FileChangedEvent`]s.
mod path;
mod registry;
mod service;

pub use path::canonicalise;
pub use registry::{FileChangedEvent, FileWatchRegistry, ItemId};
pub use service::{ChangeKind, FileChangeService, WatchCookie, WatchError};
