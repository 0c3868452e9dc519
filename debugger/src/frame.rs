use std::path::Path;
use std::sync::{Arc, Weak};

use crate::expr;
use crate::session::{CompletionHandler, SessionError, Thread};
use crate::types::{EvaluationResult, FrameId, Module};

/// One activation record in a paused call stack.
///
/// A frame is created variable-less from the debuggee's backtrace report;
/// [`StackFrame::set_variables`] and [`StackFrame::set_arg_count`] are filled
/// in by a second round-trip once the debuggee describes the frame contents.
///
/// The frame holds a non-owning reference to its thread. Once the thread
/// resumes or exits, the frame is stale: operations that reach the debuggee
/// fail non-fatally and the caller refreshes its view of the call stack.
#[derive(Debug)]
pub struct StackFrame {
    frame_id: FrameId,
    function_name: String,
    start_line: usize,
    end_line: usize,
    current_line: usize,
    arg_count: usize,
    variables: Vec<EvaluationResult>,
    thread: Weak<Thread>,
    module: Arc<Module>,
}

impl StackFrame {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        thread: &Arc<Thread>,
        module: Arc<Module>,
        function_name: impl Into<String>,
        start_line: usize,
        end_line: usize,
        current_line: usize,
        arg_count: usize,
        frame_id: FrameId,
    ) -> Self {
        Self {
            frame_id,
            function_name: function_name.into(),
            start_line,
            end_line,
            current_line,
            arg_count,
            variables: Vec::new(),
            thread: Arc::downgrade(thread),
            module,
        }
    }

    /// The line where the enclosing function/class/module starts.
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// The line where the enclosing function/class/module ends.
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// The line currently executing in this frame.
    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Source path, resolved through the owning module.
    pub fn file_name(&self) -> &Path {
        self.module.path()
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// The owning thread, or `None` once the thread has gone away.
    pub fn thread(&self) -> Option<Arc<Thread>> {
        self.thread.upgrade()
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    /// Install the variable list reported by the debuggee's frame-contents
    /// response. Invoked by the backtrace population pass, not by UI callers.
    pub fn set_variables(&mut self, variables: Vec<EvaluationResult>) {
        self.variables = variables;
    }

    /// Record how many leading entries of the variable list are parameters.
    /// Invoked by the backtrace population pass, not by UI callers.
    pub fn set_arg_count(&mut self, arg_count: usize) {
        self.arg_count = arg_count;
    }

    /// The first `arg_count` variables, in the order the debuggee reported
    /// them.
    pub fn parameters(&self) -> &[EvaluationResult] {
        &self.variables[..self.partition_point()]
    }

    /// Everything after the parameters, in the order the debuggee reported
    /// them.
    pub fn locals(&self) -> &[EvaluationResult] {
        &self.variables[self.partition_point()..]
    }

    // A frame mid-population may carry an arg count ahead of its variables.
    fn partition_point(&self) -> usize {
        self.arg_count.min(self.variables.len())
    }

    /// Check that `text` is a syntactically plausible expression without
    /// evaluating it. On failure the error carries one diagnostic per line.
    pub fn try_parse_text(&self, text: &str) -> Result<(), String> {
        let diagnostics = expr::check(text);
        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(diagnostics.join("\n"))
        }
    }

    /// Submit `text` for evaluation against this specific frame. The result
    /// arrives through `on_complete`, possibly on another thread.
    #[tracing::instrument(skip(self, text, on_complete), fields(frame = self.frame_id))]
    pub fn execute_text(
        &self,
        text: &str,
        on_complete: CompletionHandler,
    ) -> Result<(), SessionError> {
        let thread = self
            .thread
            .upgrade()
            .ok_or(SessionError::StaleFrame(self.frame_id))?;
        thread.session().execute_text(self.frame_id, text, on_complete)
    }

    /// Ask the debuggee to move execution of this frame to `line`. Returns
    /// `true` and updates [`StackFrame::current_line`] if the debuggee
    /// accepts; on refusal the cursor is left untouched.
    #[tracing::instrument(skip(self), fields(frame = self.frame_id))]
    pub fn set_line_number(&mut self, line: usize) -> bool {
        let Some(thread) = self.thread.upgrade() else {
            tracing::debug!("owning thread has gone away, frame is stale");
            return false;
        };

        match thread.session().set_line_number(self.frame_id, line) {
            Ok(()) => {
                self.current_line = line;
                true
            }
            Err(error) => {
                tracing::debug!(%error, line, "debuggee refused line change");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::StackFrame;
    use crate::session::{CompletionHandler, DebugSession, SessionError, Thread};
    use crate::types::{EvaluationResult, FrameId, Module};

    struct NullSession;

    impl DebugSession for NullSession {
        fn set_line_number(&self, _frame: FrameId, _line: usize) -> Result<(), SessionError> {
            Ok(())
        }

        fn execute_text(
            &self,
            _frame: FrameId,
            _text: &str,
            _on_complete: CompletionHandler,
        ) -> Result<(), SessionError> {
            Ok(())
        }
    }

    fn variables(names: &[&str]) -> Vec<EvaluationResult> {
        names
            .iter()
            .map(|name| EvaluationResult {
                expression: name.to_string(),
                value: format!("value of {name}"),
                type_name: None,
            })
            .collect()
    }

    fn paused_frame() -> (Arc<Thread>, StackFrame) {
        let thread = Arc::new(Thread::new(1, "main", Arc::new(NullSession)));
        let module = Arc::new(Module::new(1, "/srv/app/server.js"));
        let frame = StackFrame::new(&thread, module, "handleRequest", 10, 42, 17, 0, 0);
        (thread, frame)
    }

    #[test]
    fn partition_covers_every_variable_for_every_arg_count() {
        let (_thread, mut frame) = paused_frame();
        let all = variables(&["req", "res", "next", "body", "err"]);

        for arg_count in 0..=all.len() {
            frame.set_variables(all.clone());
            frame.set_arg_count(arg_count);

            assert_eq!(frame.parameters(), &all[..arg_count]);
            assert_eq!(frame.locals(), &all[arg_count..]);
            assert_eq!(
                frame.parameters().len() + frame.locals().len(),
                all.len(),
                "partition must cover the variable list for arg_count {arg_count}"
            );
        }
    }

    #[test]
    fn arg_count_ahead_of_variables_does_not_panic() {
        let (_thread, mut frame) = paused_frame();
        frame.set_arg_count(3);

        assert!(frame.parameters().is_empty());
        assert!(frame.locals().is_empty());

        frame.set_variables(variables(&["req"]));
        assert_eq!(frame.parameters().len(), 1);
        assert!(frame.locals().is_empty());
    }

    #[test]
    fn identity_accessors() {
        let (thread, frame) = paused_frame();

        assert_eq!(frame.frame_id(), 0);
        assert_eq!(frame.function_name(), "handleRequest");
        assert_eq!(frame.start_line(), 10);
        assert_eq!(frame.end_line(), 42);
        assert_eq!(frame.current_line(), 17);
        assert_eq!(frame.file_name(), std::path::Path::new("/srv/app/server.js"));
        assert_eq!(frame.module().name(), "server.js");
        assert_eq!(frame.thread().unwrap().id(), thread.id());
    }

    #[test]
    fn thread_accessor_observes_exited_thread() {
        let (thread, frame) = paused_frame();
        assert!(frame.thread().is_some());

        drop(thread);
        assert!(frame.thread().is_none());
    }
}
