use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use debugger::{
    CompletionHandler, DebugSession, EvaluationResult, FrameId, Module, SessionError, StackFrame,
    Thread,
};
use eyre::WrapErr;
use tracing_subscriber::EnvFilter;

/// Scripted debuggee proxy that records every request it receives.
#[derive(Default)]
struct ScriptedSession {
    refuse_jumps: AtomicBool,
    line_requests: Mutex<Vec<(FrameId, usize)>>,
    evaluations: Mutex<Vec<(FrameId, String)>>,
}

impl DebugSession for ScriptedSession {
    fn set_line_number(&self, frame: FrameId, line: usize) -> Result<(), SessionError> {
        self.line_requests.lock().unwrap().push((frame, line));
        if self.refuse_jumps.load(Ordering::SeqCst) {
            Err(SessionError::Rejected("target line is unreachable".into()))
        } else {
            Ok(())
        }
    }

    fn execute_text(
        &self,
        frame: FrameId,
        text: &str,
        on_complete: CompletionHandler,
    ) -> Result<(), SessionError> {
        self.evaluations.lock().unwrap().push((frame, text.to_string()));

        let result = EvaluationResult {
            expression: text.to_string(),
            value: format!("evaluated `{text}`"),
            type_name: Some("string".to_string()),
        };

        // completion arrives from a notification thread, like the real wire
        // protocol client
        std::thread::spawn(move || on_complete(result));
        Ok(())
    }
}

fn paused_frame(session: &Arc<ScriptedSession>) -> (Arc<Thread>, StackFrame) {
    let thread = Arc::new(Thread::new(1, "main", Arc::clone(session) as Arc<dyn DebugSession>));
    let module = Arc::new(Module::new(7, "/srv/app/server.js"));
    let frame = StackFrame::new(&thread, module, "handleRequest", 10, 42, 17, 2, 0);
    (thread, frame)
}

// test suite "constructor"
#[ctor::ctor]
fn init() {
    if std::io::stderr().is_terminal() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .json()
            .try_init();
    }

    // error traces
    let _ = color_eyre::install();
}

#[test]
fn accepted_line_jump_moves_the_cursor() {
    let session = Arc::new(ScriptedSession::default());
    let (_thread, mut frame) = paused_frame(&session);

    assert!(frame.set_line_number(23));
    assert_eq!(frame.current_line(), 23);
    assert_eq!(*session.line_requests.lock().unwrap(), vec![(0, 23)]);
}

#[test]
fn refused_line_jump_leaves_the_cursor() {
    let session = Arc::new(ScriptedSession::default());
    session.refuse_jumps.store(true, Ordering::SeqCst);
    let (_thread, mut frame) = paused_frame(&session);

    assert!(!frame.set_line_number(23));
    assert_eq!(frame.current_line(), 17);

    // the frame remains usable: a later accepted jump still works
    session.refuse_jumps.store(false, Ordering::SeqCst);
    assert!(frame.set_line_number(31));
    assert_eq!(frame.current_line(), 31);
}

#[test]
fn evaluation_completes_through_the_callback() -> eyre::Result<()> {
    let session = Arc::new(ScriptedSession::default());
    let (_thread, frame) = paused_frame(&session);

    let (tx, rx) = crossbeam_channel::bounded(1);
    frame
        .execute_text(
            "request.headers",
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )
        .wrap_err("submitting expression")?;

    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .wrap_err("waiting for evaluation result")?;
    assert_eq!(result.expression, "request.headers");
    assert_eq!(result.value, "evaluated `request.headers`");

    // the frame is still queryable after an evaluation round-trip
    assert_eq!(frame.current_line(), 17);
    Ok(())
}

#[test]
fn evaluations_reach_the_session_in_submission_order() -> eyre::Result<()> {
    let session = Arc::new(ScriptedSession::default());
    let (_thread, frame) = paused_frame(&session);

    for text in ["a", "b", "c"] {
        frame
            .execute_text(text, Box::new(|_| {}))
            .wrap_err("submitting expression")?;
    }

    let seen = session.evaluations.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            (0, "a".to_string()),
            (0, "b".to_string()),
            (0, "c".to_string())
        ]
    );
    Ok(())
}

#[test]
fn stale_frame_fails_non_fatally() {
    let session = Arc::new(ScriptedSession::default());
    let (thread, mut frame) = paused_frame(&session);

    // thread resumed/exited: the owner dropped it
    drop(thread);

    assert!(!frame.set_line_number(23));
    assert_eq!(frame.current_line(), 17);

    let outcome = frame.execute_text("x", Box::new(|_| {}));
    assert!(matches!(outcome, Err(SessionError::StaleFrame(0))));

    // nothing reached the session
    assert!(session.line_requests.lock().unwrap().is_empty());
    assert!(session.evaluations.lock().unwrap().is_empty());
}

#[test]
fn try_parse_text_reports_joined_diagnostics() {
    let session = Arc::new(ScriptedSession::default());
    let (_thread, frame) = paused_frame(&session);

    assert_eq!(frame.try_parse_text("request.headers['host']"), Ok(()));

    let message = frame
        .try_parse_text("f([x, 'oops")
        .expect_err("malformed expression must be rejected");
    let lines: Vec<&str> = message.lines().collect();
    assert_eq!(lines.len(), 3, "one diagnostic per line: {message}");

    // validation never reaches the debuggee
    assert!(session.evaluations.lock().unwrap().is_empty());
}
