//! Mock GDB REPL binary for integration testing
//!
//! Implements just enough of the GDB prompt protocol to exercise the
//! session driver without a real debugger: a canned stack, canned value
//! renderings with incrementing result indexes, and the signal-trap
//! response to `run`.

use std::io::{BufRead, BufReader, Write};

const PROMPT: &str = "(gdb) ";

const FRAME_LINE: &str = "#1  0x00007f56a9c1e2f0 in arrow::gdb::TestSession () at gdb_util.cc:42";

const STACK: &str = "\
#0  0x00007f56b0a9ba37 in __pthread_kill_implementation ()
#1  0x00007f56a9c1e2f0 in arrow::gdb::TestSession () at gdb_util.cc:42
#2  0x00005653e8bd5a10 in main ()";

enum Reply {
    Text(String),
    Quit,
}

fn main() {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = stdout.lock();

    let mut value_counter = 0u32;

    writeln!(writer, "GNU gdb (mock-gdb) 13.1").ok();
    writeln!(writer, "Reading symbols from python3...").ok();
    prompt(&mut writer);

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break; // EOF
        }

        match respond(line.trim_end(), &mut value_counter) {
            Reply::Text(text) => {
                if !text.is_empty() {
                    writeln!(writer, "{text}").ok();
                }
                prompt(&mut writer);
            }
            Reply::Quit => break,
        }
    }
}

fn prompt<W: Write>(writer: &mut W) {
    // no trailing newline: the prompt is the partial line the driver waits on
    write!(writer, "{PROMPT}").ok();
    writer.flush().ok();
}

fn respond(cmd: &str, counter: &mut u32) -> Reply {
    if cmd == "quit" || cmd == "q" {
        return Reply::Quit;
    }
    if cmd == "show version" {
        return Reply::Text("GNU gdb (mock-gdb) 13.1".to_string());
    }
    if cmd == "info stack" {
        return Reply::Text(STACK.to_string());
    }
    if let Some(num) = cmd.strip_prefix("frame ") {
        return Reply::Text(match num.trim() {
            "1" => FRAME_LINE.to_string(),
            other => format!("No frame at level {other}."),
        });
    }
    if cmd == "run" || cmd.starts_with("run ") {
        return Reply::Text(format!(
            "Program received signal SIGTRAP, Trace/breakpoint trap.\n{FRAME_LINE}"
        ));
    }
    if cmd.starts_with("set ") || cmd.starts_with("source ") {
        return Reply::Text(String::new());
    }
    if let Some(expr) = cmd.strip_prefix("p ") {
        return Reply::Text(print_reply(expr, counter));
    }
    Reply::Text(format!("Undefined command: \"{cmd}\"."))
}

/// Canned `p` responses. Successful prints get a fresh `$N = ` annotation;
/// unknown expressions get the usual no-symbol error without one.
fn print_reply(expr: &str, counter: &mut u32) -> String {
    let value = match expr {
        "42 + 1" => Some("43".to_string()),
        "buffer_null" => Some("arrow::Buffer of size 0, read-only".to_string()),
        "buffer_abc" => Some(r#"arrow::Buffer of size 3, read-only, "abc""#.to_string()),
        "int32_array" => Some("arrow::Int32Array of length 4, null count 1".to_string()),
        // dereferenced heap values carry an address prefix, as real GDB does
        "*heap_buffer" => {
            Some(r#"0x5653e8bd6f20 arrow::Buffer of size 3, read-only, "abc""#.to_string())
        }
        // wide results pick up trailing whitespace from column formatting
        "wide_value" => Some("43  ".to_string()),
        _ => None,
    };

    match value {
        Some(v) => {
            *counter += 1;
            format!("${counter} = {v}")
        }
        None => format!(r#"No symbol "{expr}" in current context."#),
    }
}
