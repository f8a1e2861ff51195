//! Environment probing and the Arrow test fixture
//!
//! Builds the shared session the pretty-printer checks run against: start
//! GDB around a Python interpreter, source the printer script, trigger the
//! deliberate in-process breakpoint and select the test-entry frame. One
//! fixture is reused for a whole run; teardown is explicit via `join`.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use once_cell::sync::Lazy;

use crate::common::{Error, Result};
use crate::session::GdbSession;

/// Fixed command prefix for every debugger invocation. `--nx` keeps user
/// init files from interfering with output formatting.
pub const GDB_COMMAND: [&str; 2] = ["gdb", "--nx"];

/// Environment variable overriding the pretty-printer script location.
pub const SCRIPT_ENV_VAR: &str = "ARROW_GDB_SCRIPT";

/// Function the breakpoint snippet traps inside.
pub const TEST_ENTRY_FUNCTION: &str = "arrow::gdb::TestSession";

/// One-line interpreter snippet that raises the deliberate trap.
const BREAKPOINT_SNIPPET: &str = "from pyarrow.lib import _gdb_test_session; _gdb_test_session()";

static GDB_AVAILABLE: Lazy<bool> = Lazy::new(|| {
    Command::new(GDB_COMMAND[0])
        .arg(GDB_COMMAND[1])
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
});

/// Whether a working `gdb` is on the PATH. Cached for the whole run so the
/// probe subprocess runs at most once.
pub fn gdb_available() -> bool {
    *GDB_AVAILABLE
}

/// Locate the interpreter hosting the columnar library.
pub fn python_executable() -> Result<PathBuf> {
    which::which("python3").map_err(|_| Error::InterpreterNotFound("python3".to_string()))
}

/// Pretty-printer script path: environment override, or the in-tree
/// location next to this crate.
pub fn script_path() -> PathBuf {
    match env::var_os(SCRIPT_ENV_VAR) {
        Some(path) => PathBuf::from(path),
        None => Path::new(env!("CARGO_MANIFEST_DIR")).join("../cpp/gdb_arrow.py"),
    }
}

/// Resolve the script path and check it points at an existing file.
pub fn resolve_script() -> Result<PathBuf> {
    let script = script_path();
    if script.exists() {
        Ok(script)
    } else {
        Err(Error::ScriptNotFound(script))
    }
}

/// A GDB session prepared for printing Arrow values.
pub struct ArrowFixture {
    session: GdbSession,
}

impl ArrowFixture {
    /// Start a GDB session around the Python interpreter and normalize its
    /// output formatting. The child gets an empty environment; nothing of
    /// ours leaks in.
    pub fn start() -> Result<Self> {
        let python = python_executable()?;
        let python = python.to_string_lossy().into_owned();

        let mut session =
            GdbSession::start(GDB_COMMAND[0], &[GDB_COMMAND[1], "-q", python.as_str()], &[])?;
        session.wait_until_ready()?;
        session.run_command("set confirm off")?;
        session.run_command("set print array-indexes on")?;
        // Keep formatting independent of the terminal
        session.run_command("set width unlimited")?;
        session.run_command("set charset UTF-8")?;

        Ok(Self { session })
    }

    /// Source the pretty-printer script, trigger the deliberate breakpoint
    /// and select the test-entry frame.
    pub fn load_pretty_printers(&mut self) -> Result<()> {
        let script = resolve_script()?;
        tracing::info!(script = %script.display(), "loading pretty-printer script");
        self.session.run_command(&format!("source {}", script.display()))?;
        self.trigger_breakpoint()
    }

    /// Run the interpreter snippet that traps inside the test entry point,
    /// then force the current frame to that function.
    fn trigger_breakpoint(&mut self) -> Result<()> {
        let out = self
            .session
            .run_command(&format!("run -c '{BREAKPOINT_SNIPPET}'"))?;
        if !(out.contains("Trace/breakpoint trap") || out.contains("received signal")) {
            return Err(Error::unexpected_output(
                "waiting for the deliberate trap",
                &out,
            ));
        }
        self.session.select_frame(TEST_ENTRY_FUNCTION)
    }

    /// The underlying session, for issuing commands and printing values.
    pub fn session(&mut self) -> &mut GdbSession {
        &mut self.session
    }

    /// Explicit teardown. Dropping the fixture joins too, as a fallback.
    pub fn join(&mut self) -> Result<()> {
        self.session.join()
    }
}
