//! Terminal UI helpers

use std::io::Write;

use colored::Colorize;

/// Transient status line on stderr, cleared when dropped
pub struct Progress<'a> {
    err: &'a mut dyn Write,
    width: usize,
}

impl<'a> Progress<'a> {
    pub fn start(err: &'a mut dyn Write, message: &str) -> Self {
        let text = format!("{}...", message);
        let _ = write!(err, "{}", text.dimmed());
        let _ = err.flush();
        Self {
            err,
            width: text.chars().count(),
        }
    }
}

impl Drop for Progress<'_> {
    fn drop(&mut self) {
        let _ = write!(self.err, "\r{}\r", " ".repeat(self.width));
        let _ = self.err.flush();
    }
}
