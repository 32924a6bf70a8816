//! Console capability: prompts, output, clearing and terminal height.

use std::collections::VecDeque;
use std::io;

/// Everything the session needs from the terminal.
pub trait Console {
    /// Shows `prompt` and reads one line of input, without its terminator.
    ///
    /// Returns `Ok(None)` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Writes one line of output.
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// Clears the screen before a redraw.
    fn clear(&mut self) -> io::Result<()>;

    /// Returns the terminal height in rows, if known.
    fn rows(&self) -> Option<u16>;
}

/// A console that replays queued input and records all output.
///
/// Useful for tests and for driving a session from a script.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    output: Vec<String>,
    prompts: Vec<String>,
    clears: usize,
    rows: Option<u16>,
}

impl ScriptedConsole {
    /// Creates a console that will answer prompts with `input`, in order.
    pub fn new<I, T>(input: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Reports a fixed terminal height.
    pub fn with_rows(mut self, rows: u16) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Queues more input.
    pub fn push_input(&mut self, line: impl Into<String>) {
        self.input.push_back(line.into());
    }

    /// Everything written so far, one entry per line.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Every prompt shown so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// How many times the screen was cleared.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Input that was never consumed.
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.input.pop_front())
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.output.push(text.to_string());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn rows(&self) -> Option<u16> {
        self.rows
    }
}
