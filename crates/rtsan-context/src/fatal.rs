//! Allocation-free stderr reporting.
//!
//! Lines are formatted into a fixed stack buffer and written straight to fd 2.
//! This path runs while the registry is bootstrapping, so it must not touch the
//! global allocator or `std::io` locks that interceptors may be watching.

use std::fmt::{self, Write};

use crate::config::verbosity;
use crate::error::ContextError;

const LINE_CAP: usize = 256;
const PREFIX: &str = "rtsan-context: ";

/// Fixed-capacity line buffer. Output past capacity is dropped.
pub(crate) struct StackLine {
    buf: [u8; LINE_CAP],
    len: usize,
}

impl StackLine {
    pub(crate) const fn new() -> Self {
        Self {
            buf: [0; LINE_CAP],
            len: 0,
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Write for StackLine {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        // Keep one byte for the trailing newline.
        let room = LINE_CAP - 1 - self.len;
        let take = s.len().min(room);
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

#[cfg(unix)]
fn write_stderr(bytes: &[u8]) {
    let mut rest = bytes;
    while !rest.is_empty() {
        // SAFETY: `rest` is a live slice; fd 2 may be closed, which write reports.
        let n = unsafe { libc::write(libc::STDERR_FILENO, rest.as_ptr().cast(), rest.len()) };
        if n <= 0 {
            return;
        }
        rest = &rest[n as usize..];
    }
}

#[cfg(not(unix))]
fn write_stderr(bytes: &[u8]) {
    use std::io::Write as _;
    let _ = std::io::stderr().write_all(bytes);
}

pub(crate) fn format_line(args: fmt::Arguments<'_>) -> StackLine {
    let mut line = StackLine::new();
    let _ = line.write_str(PREFIX);
    let _ = line.write_fmt(args);
    line.buf[line.len] = b'\n';
    line.len += 1;
    line
}

fn emit(args: fmt::Arguments<'_>) {
    write_stderr(format_line(args).as_bytes());
}

/// Emit a diagnostic line if the configured verbosity is at least `level`.
pub(crate) fn trace(level: u8, args: fmt::Arguments<'_>) {
    if verbosity() >= level {
        emit(args);
    }
}

/// Report an unrecoverable registry failure and abort the process.
#[cold]
pub fn die(err: ContextError) -> ! {
    emit(format_args!("fatal: {err}"));
    std::process::abort()
}
