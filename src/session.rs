//! Interactive GDB session driver
//!
//! Manages a child debugger process as a line-oriented REPL: commands go in
//! on stdin, response lines come back on stdout, and every turn ends with the
//! `(gdb) ` prompt. I/O is synchronous and strictly request/response; the
//! driver never reads ahead of the prompt.

use std::fmt;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::common::{Error, Result};

/// Literal prompt GDB emits when it is ready for the next command.
pub const PROMPT_MARKER: &[u8] = b"(gdb) ";

/// Chunk size for reads from the child's stdout.
const READ_CHUNK: usize = 4096;

static RESULT_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\d+ = ").expect("result annotation regex"));

/// Buffered child output: completed lines plus one partial trailing line.
///
/// Invariant: the partial line never contains a newline; completed lines
/// always end with one.
#[derive(Debug, Default)]
struct PendingOutput {
    completed: Vec<u8>,
    partial: Vec<u8>,
}

impl PendingOutput {
    /// Append a chunk, moving everything up to its last newline into the
    /// completed region.
    fn push_chunk(&mut self, chunk: &[u8]) {
        match chunk.iter().rposition(|&b| b == b'\n') {
            Some(idx) => {
                self.completed.append(&mut self.partial);
                self.completed.extend_from_slice(&chunk[..=idx]);
                self.partial.extend_from_slice(&chunk[idx + 1..]);
            }
            None => self.partial.extend_from_slice(chunk),
        }
    }

    /// True once the trailing partial line starts with the prompt marker.
    fn at_prompt(&self) -> bool {
        self.partial.starts_with(PROMPT_MARKER)
    }

    /// Return the completed response text and reset the buffer to empty.
    /// The trailing partial line (the prompt itself) is discarded.
    fn take_response(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.completed).into_owned();
        self.completed.clear();
        self.partial.clear();
        out
    }
}

/// One live debugger subprocess driven as a REPL.
///
/// Lifecycle: `start` → commands → `join`. `join` is also run from `Drop` as
/// a last-resort safety net, but explicit teardown is the expected path.
pub struct GdbSession {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    pending: PendingOutput,
    echo: bool,
}

impl fmt::Debug for GdbSession {
    // The pipe handles carry nothing worth printing
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GdbSession")
            .field("running", &self.child.is_some())
            .field("echo", &self.echo)
            .finish_non_exhaustive()
    }
}

impl GdbSession {
    /// Launch a child REPL with the given arguments and an explicit
    /// environment; nothing is inherited from our own environment.
    ///
    /// The child's stderr stays connected to ours so diagnostic text
    /// surfaces independently of the captured output.
    pub fn start(program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .env_clear()
            .envs(env.iter().copied())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::DebuggerNotFound(program.to_string()),
                _ => Error::Io(e),
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        tracing::debug!(program, ?args, "debugger session started");

        Ok(Self {
            child: Some(child),
            stdin,
            stdout,
            pending: PendingOutput::default(),
            echo: true,
        })
    }

    /// Enable or disable echoing of raw session traffic to our own stdout.
    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    /// Whether the child process has neither exited nor been joined.
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Record output until the prompt displays. Returns the recorded output.
    ///
    /// No timeout is enforced: an unresponsive child blocks the caller, which
    /// is acceptable for a supervised interactive session. A child that exits
    /// before the prompt appears is an error.
    pub fn wait_until_ready(&mut self) -> Result<String> {
        let mut buf = [0u8; READ_CHUNK];
        while !self.pending.at_prompt() {
            let child = self.child.as_mut().ok_or(Error::SessionNotRunning)?;
            if child.try_wait()?.is_some() {
                return Err(Error::SessionTerminated);
            }
            let stdout = self.stdout.as_mut().ok_or(Error::SessionNotRunning)?;
            let n = stdout.read(&mut buf)?;
            if n == 0 {
                // EOF: the child closed its end before becoming ready
                return Err(Error::SessionTerminated);
            }
            if self.echo {
                let mut out = io::stdout().lock();
                out.write_all(&buf[..n])?;
                out.flush()?;
            }
            self.pending.push_chunk(&buf[..n]);
        }
        Ok(self.pending.take_response())
    }

    /// Write one command line to the child and flush immediately so the
    /// child observes it without buffering delay.
    pub fn issue_command(&mut self, line: &str) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or(Error::SessionNotRunning)?;
        let mut bytes = line.as_bytes().to_vec();
        bytes.push(b'\n');
        if self.echo {
            let mut out = io::stdout().lock();
            out.write_all(&bytes)?;
            out.flush()?;
        }
        stdin.write_all(&bytes)?;
        stdin.flush()?;
        Ok(())
    }

    /// Issue a command and wait for the next prompt; returns the response.
    pub fn run_command(&mut self, line: &str) -> Result<String> {
        tracing::debug!(command = line, "running debugger command");
        self.issue_command(line)?;
        self.wait_until_ready()
    }

    /// Print the value of an expression and return its rendering, with the
    /// leading `$N = ` annotation stripped and incidental whitespace from
    /// variable-width formatting trimmed.
    pub fn print_value(&mut self, expr: &str) -> Result<String> {
        let out = self.run_command(&format!("p {expr}"))?;
        let stripped = strip_result_annotation(&out)?;
        Ok(stripped.trim().to_string())
    }

    /// Select the innermost frame executing the given function.
    ///
    /// Old GDB versions lack the "frame function" command, so the stack
    /// trace is parsed for a matching frame number instead. After selecting,
    /// the new current-frame text is checked to mention the function.
    pub fn select_frame(&mut self, func_name: &str) -> Result<()> {
        let out = self.run_command("info stack")?;
        let frame_num = frame_number_for(&out, func_name).ok_or_else(|| Error::FrameNotFound {
            function: func_name.to_string(),
            stack: out,
        })?;
        let out = self.run_command(&format!("frame {frame_num}"))?;
        if !out.contains(&format!("in {func_name}")) {
            return Err(Error::unexpected_output(
                &format!("selecting frame for '{func_name}'"),
                &out,
            ));
        }
        Ok(())
    }

    /// Tear the session down: close both streams, kill the child and reap
    /// it. Safe to call repeatedly or on an already-terminated session.
    pub fn join(&mut self) -> Result<()> {
        self.stdin.take();
        self.stdout.take();
        if let Some(mut child) = self.child.take() {
            // kill may race with a natural exit
            child.kill().ok();
            child.wait()?;
            tracing::debug!("debugger session joined");
        }
        Ok(())
    }
}

impl Drop for GdbSession {
    fn drop(&mut self) {
        let _ = self.join();
    }
}

/// Strip exactly one leading `$N = ` result annotation from a response.
/// Responses without the annotation (errors, informational text) fail with
/// the raw output attached.
pub fn strip_result_annotation(out: &str) -> Result<String> {
    match RESULT_ANNOTATION.find(out) {
        Some(m) => Ok(out[m.end()..].to_string()),
        None => Err(Error::MissingResultAnnotation {
            output: out.to_string(),
        }),
    }
}

/// Find the innermost frame number whose stack line names the given
/// function. The match is case-insensitive and anchored at the frame-number
/// field of each line.
pub fn frame_number_for(stack: &str, func_name: &str) -> Option<usize> {
    let pat = format!(r"(?mi)^#(\d+)\s+.* in {} ", regex::escape(func_name));
    let re = Regex::new(&pat).ok()?;
    let caps = re.captures(stack)?;
    caps[1].parse().ok()
}
