use std::fmt;
use std::sync::Arc;

use crate::types::{EvaluationResult, FrameId, ThreadId};

/// Callback invoked once the debuggee finishes evaluating an expression.
///
/// Completion may run on an arbitrary notification thread; callers that need
/// thread affinity marshal the result back themselves.
pub type CompletionHandler = Box<dyn FnOnce(EvaluationResult) + Send + 'static>;

/// Why the debuggee proxy refused a request.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The owning thread resumed or exited, so the frame no longer maps onto
    /// live debuggee state.
    #[error("frame {0} is stale")]
    StaleFrame(FrameId),

    /// The debuggee understood the request and turned it down.
    #[error("request rejected by debuggee: {0}")]
    Rejected(String),
}

/// Proxy to the debuggee process that owns a paused thread.
///
/// Implementations sit on top of the wire protocol; this crate only models
/// the frame-level view over them. Requests carry no timeout here, the
/// caller owns cancellation.
pub trait DebugSession: Send + Sync {
    /// Ask the debuggee to move the point of execution of `frame` to `line`.
    fn set_line_number(&self, frame: FrameId, line: usize) -> Result<(), SessionError>;

    /// Submit `text` for evaluation in the context of `frame`. The result is
    /// delivered asynchronously through `on_complete`. Submission order per
    /// frame is preserved by the implementation, not enforced here.
    fn execute_text(
        &self,
        frame: FrameId,
        text: &str,
        on_complete: CompletionHandler,
    ) -> Result<(), SessionError>;
}

/// A paused thread in the debuggee.
///
/// The thread owns the [`DebugSession`] delegate its frames use to reach the
/// process. Frames hold only a [`std::sync::Weak`] reference back to their
/// thread: when the thread resumes or exits and is dropped, every dependent
/// frame becomes observably stale.
pub struct Thread {
    id: ThreadId,
    name: String,
    session: Arc<dyn DebugSession>,
}

impl Thread {
    pub fn new(id: ThreadId, name: impl Into<String>, session: Arc<dyn DebugSession>) -> Self {
        Self {
            id,
            name: name.into(),
            session,
        }
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session(&self) -> &Arc<dyn DebugSession> {
        &self.session
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
