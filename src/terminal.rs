//! Terminal-backed console.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::{cursor, execute, terminal};
use medit_core::Console;

/// Reads commands from stdin and draws on stdout.
///
/// Screen clearing is skipped when stdout is not a terminal. Colour is
/// controlled by the editor config; see `interactive_config` in `main`.
pub struct TerminalConsole {
    interactive: bool,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            interactive: io::stdout().is_terminal(),
        }
    }

    /// Returns true if stdout is a terminal.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads one line, without its line ending.
///
/// Bytes that are not valid UTF-8 become U+FFFD instead of failing the read.
fn read_input_line(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut bytes = Vec::new();
    if reader.read_until(b'\n', &mut bytes)? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&bytes);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        read_input_line(&mut io::stdin().lock())
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(io::stdout(), "{text}")
    }

    fn clear(&mut self) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        execute!(
            io::stdout(),
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        )
    }

    fn rows(&self) -> Option<u16> {
        terminal::size().ok().map(|(_, rows)| rows)
    }
}
