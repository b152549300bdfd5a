//! Per-invocation output sink.
//!
//! A [`Console`] is handed to every handler and to the dispatcher, so nothing
//! writes to process-wide stdout/stderr directly. Tests use
//! [`Console::captured`] to read back what a run printed.

use anstyle::{AnsiColor, Style};
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

type Sink = Box<dyn Write + Send>;

/// Output streams for one invocation.
pub struct Console {
    out: Sink,
    err: Sink,
    color: bool,
    err_color: bool,
}

impl Console {
    /// Wrap arbitrary writers. Color is off.
    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Box::new(out),
            err: Box::new(err),
            color: false,
            err_color: false,
        }
    }

    /// Process stdout/stderr.
    ///
    /// Each stream is colored when it is a terminal and `NO_COLOR` is unset.
    pub fn stdio() -> Self {
        let allowed = std::env::var_os("NO_COLOR").is_none();
        Self::new(io::stdout(), io::stderr())
            .with_color(allowed && io::stdout().is_terminal())
            .with_err_color(allowed && io::stderr().is_terminal())
    }

    /// A console writing into in-memory buffers.
    pub fn captured() -> (Self, Captured) {
        let captured = Captured::default();
        let console = Self::new(
            SharedBuffer(Arc::clone(&captured.out)),
            SharedBuffer(Arc::clone(&captured.err)),
        );
        (console, captured)
    }

    /// Enable or disable color on both streams.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self.err_color = color;
        self
    }

    /// Enable or disable color on stderr only.
    pub fn with_err_color(mut self, color: bool) -> Self {
        self.err_color = color;
        self
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Standard error stream.
    pub fn err(&mut self) -> &mut dyn Write {
        &mut *self.err
    }

    /// Apply `style` to `text` when stdout color is enabled.
    pub fn paint(&self, style: Style, text: &str) -> String {
        paint_if(self.color, style, text)
    }

    /// Write the single-line diagnostic for a failed invocation.
    pub fn error_line(&mut self, message: &dyn std::fmt::Display) -> io::Result<()> {
        let label = paint_if(self.err_color, AnsiColor::Red.on_default().bold(), "Error");
        writeln!(self.err, "{}: {}", label, message)?;
        self.err.flush()
    }
}

fn paint_if(color: bool, style: Style, text: &str) -> String {
    if color {
        format!("{}{}{}", style.render(), text, style.render_reset())
    } else {
        text.to_string()
    }
}

/// Handlers print with `writeln!(console, ...)`; this goes to stdout.
impl Write for Console {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Read side of [`Console::captured`].
#[derive(Clone, Default)]
pub struct Captured {
    out: Arc<Mutex<Vec<u8>>>,
    err: Arc<Mutex<Vec<u8>>>,
}

impl Captured {
    pub fn stdout(&self) -> String {
        read_lossy(&self.out)
    }

    pub fn stderr(&self) -> String {
        read_lossy(&self.err)
    }
}

fn read_lossy(buffer: &Mutex<Vec<u8>>) -> String {
    let bytes = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    String::from_utf8_lossy(&bytes).into_owned()
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "capture buffer poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_streams_are_separate() {
        let (mut console, captured) = Console::captured();
        writeln!(console, "hello").unwrap();
        writeln!(console.err(), "oops").unwrap();

        assert_eq!(captured.stdout(), "hello\n");
        assert_eq!(captured.stderr(), "oops\n");
    }

    #[test]
    fn test_paint_without_color_is_plain() {
        let (console, _) = Console::captured();
        let style = AnsiColor::Green.on_default();
        assert_eq!(console.paint(style, "ok"), "ok");
    }

    #[test]
    fn test_paint_with_color_wraps_text() {
        let (console, _) = Console::captured();
        let console = console.with_color(true);
        let painted = console.paint(Style::new().bold(), "Commands");
        assert!(painted.starts_with("\u{1b}["));
        assert!(painted.contains("Commands"));
    }

    #[test]
    fn test_streams_colored_independently() {
        let (console, captured) = Console::captured();
        let mut console = console.with_color(true).with_err_color(false);
        console.error_line(&"boom").unwrap();
        assert_eq!(captured.stderr(), "Error: boom\n");
        assert_ne!(console.paint(Style::new().bold(), "ok"), "ok");

        let (console, captured) = Console::captured();
        let mut console = console.with_err_color(true);
        console.error_line(&"boom").unwrap();
        assert!(captured.stderr().starts_with("\u{1b}["));
        assert_eq!(console.paint(Style::new().bold(), "ok"), "ok");
    }

    #[test]
    fn test_error_line() {
        let (mut console, captured) = Console::captured();
        console.error_line(&"boom").unwrap();
        assert_eq!(captured.stderr(), "Error: boom\n");
    }
}
