//! Session driver tests against the mock GDB binary
//!
//! These run without a real debugger installed: cargo builds the `mock-gdb`
//! bin target and the driver speaks the prompt protocol to it over pipes.

use regex::Regex;

use gdb_harness::expect::{check_heap_repr, check_stack_repr};
use gdb_harness::session::GdbSession;
use gdb_harness::Error;

fn mock_session() -> GdbSession {
    let mut session = GdbSession::start(env!("CARGO_BIN_EXE_mock-gdb"), &[], &[])
        .expect("failed to start mock-gdb");
    session.set_echo(false);
    session
        .wait_until_ready()
        .expect("mock-gdb never became ready");
    session
}

#[test]
fn banner_then_prompt_then_version() {
    let mut gdb = mock_session();
    let out = gdb.run_command("show version").unwrap();
    assert!(out.starts_with("GNU gdb ("), "{out}");
    gdb.join().unwrap();
}

#[test]
fn print_value_strips_annotation_and_trims() {
    let mut gdb = mock_session();
    assert_eq!(gdb.print_value("42 + 1").unwrap(), "43");
    // formatting whitespace is trimmed
    assert_eq!(gdb.print_value("wide_value").unwrap(), "43");
    gdb.join().unwrap();
}

#[test]
fn print_value_requires_annotation() {
    let mut gdb = mock_session();
    let err = gdb.print_value("no_such_symbol").unwrap_err();
    match err {
        Error::MissingResultAnnotation { output } => {
            assert!(output.contains("No symbol"), "{output}");
        }
        other => panic!("unexpected error: {other}"),
    }
    // the session stays usable after a failed print
    assert_eq!(gdb.print_value("42 + 1").unwrap(), "43");
    gdb.join().unwrap();
}

#[test]
fn select_frame_is_idempotent() {
    let mut gdb = mock_session();
    gdb.select_frame("arrow::gdb::TestSession").unwrap();
    gdb.select_frame("arrow::gdb::TestSession").unwrap();
    gdb.join().unwrap();
}

#[test]
fn select_frame_reports_missing_function_with_stack() {
    let mut gdb = mock_session();
    let err = gdb.select_frame("not::a::Function").unwrap_err();
    match err {
        Error::FrameNotFound { function, stack } => {
            assert_eq!(function, "not::a::Function");
            assert!(stack.contains("#0"), "{stack}");
        }
        other => panic!("unexpected error: {other}"),
    }
    gdb.join().unwrap();
}

#[test]
fn trap_phrase_then_frame_selection() {
    let mut gdb = mock_session();
    let out = gdb.run_command("run -c 'snippet()'").unwrap();
    assert!(
        out.contains("Trace/breakpoint trap") || out.contains("received signal"),
        "{out}"
    );
    gdb.select_frame("arrow::gdb::TestSession").unwrap();
    gdb.join().unwrap();
}

#[test]
fn empty_buffer_renders_without_content_payload() {
    let mut gdb = mock_session();
    check_stack_repr(&mut gdb, "buffer_null", "arrow::Buffer of size 0, read-only").unwrap();
    check_stack_repr(
        &mut gdb,
        "buffer_abc",
        r#"arrow::Buffer of size 3, read-only, "abc""#,
    )
    .unwrap();

    let empty = gdb.print_value("buffer_null").unwrap();
    assert!(
        !empty.contains('"'),
        "size-0 rendering must carry no content payload: {empty}"
    );
    gdb.join().unwrap();
}

#[test]
fn pattern_expectations_match_from_start() {
    let mut gdb = mock_session();
    check_stack_repr(
        &mut gdb,
        "int32_array",
        Regex::new(r"^arrow::Int32Array of length \d+, null count \d+$").unwrap(),
    )
    .unwrap();

    let err = check_stack_repr(
        &mut gdb,
        "int32_array",
        Regex::new(r"^arrow::Int64Array ").unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ReprMismatch { .. }), "{err}");
    gdb.join().unwrap();
}

#[test]
fn heap_check_tolerates_address_prefix() {
    let mut gdb = mock_session();
    check_heap_repr(
        &mut gdb,
        "heap_buffer",
        r#"arrow::Buffer of size 3, read-only, "abc""#,
    )
    .unwrap();

    let err = check_heap_repr(&mut gdb, "heap_buffer", "arrow::Buffer of size 4").unwrap_err();
    match err {
        Error::ReprMismatch { expr, actual, .. } => {
            assert_eq!(expr, "heap_buffer");
            assert!(actual.contains("size 3"), "{actual}");
        }
        other => panic!("unexpected error: {other}"),
    }
    gdb.join().unwrap();
}

#[test]
fn join_is_idempotent_and_commands_fail_after() {
    let mut gdb = mock_session();
    assert!(gdb.is_running());
    gdb.join().unwrap();
    gdb.join().unwrap();
    assert!(!gdb.is_running());
    assert!(format!("{gdb:?}").contains("running: false"), "{gdb:?}");
    assert!(matches!(
        gdb.run_command("show version"),
        Err(Error::SessionNotRunning)
    ));
}

#[test]
fn child_exit_before_prompt_is_an_error() {
    let mut gdb = mock_session();
    gdb.issue_command("quit").unwrap();
    let err = gdb.wait_until_ready().unwrap_err();
    assert!(matches!(err, Error::SessionTerminated), "{err}");
    gdb.join().unwrap();
}

#[test]
fn missing_executable_is_a_typed_error() {
    let err = GdbSession::start("definitely-not-a-debugger-binary", &[], &[]).unwrap_err();
    match err {
        Error::DebuggerNotFound(program) => {
            assert_eq!(program, "definitely-not-a-debugger-binary");
        }
        other => panic!("unexpected error: {other}"),
    }
}
