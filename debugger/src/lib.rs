//! Frame-level model of a paused debuggee.
//!
//! The debuggee's wire protocol and process management live elsewhere; this
//! crate owns the view of a single paused stack frame: its identity, its
//! scope extent, the parameter/local partition of its variables, and the
//! operations that are delegated back to the owning process (line jumps and
//! out-of-band expression evaluation).
mod expr;
mod frame;
mod session;
mod types;

pub use frame::StackFrame;
pub use session::{CompletionHandler, DebugSession, SessionError, Thread};
pub use types::{EvaluationResult, FrameId, Module, ThreadId};
