use std::io::Write;

use hover_traits::DisplaySink;

/// Text stand-in for the status display: one `label: value` line per write.
///
/// Write errors are dropped; a broken pipe must not stall the control loop.
pub struct ConsoleDisplay<W: Write> {
    out: W,
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl ConsoleDisplay<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn show(&mut self, label: &str, value: i64, y_pos: u8) {
        let _ = writeln!(self.out, "[{y_pos:>2}] {label}: {value}");
    }
}
