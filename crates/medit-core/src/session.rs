//! The editing session state machine.
//!
//! ## Learning: The Facade Pattern
//!
//! `Session` is the only thing the binary talks to. It owns the buffer and
//! the cursor, and reaches the outside world only through the three
//! capabilities it was built with:
//!
//! ```text
//!   render ──▶ read command ──▶ dispatch ──┐
//!     ▲                                    │
//!     └────────────── running ◀────────────┘
//!                        │ quit
//!                        ▼
//!              dirty check ──▶ confirm ──▶ save
//! ```

use std::path::Path;

use medit_buffer::{Buffer, LoadOutcome, Storage};

use crate::command::{Command, HELP, Step};
use crate::config::EditorConfig;
use crate::console::Console;
use crate::diagnostics::Diagnostics;
use crate::render::{context_size, render};
use crate::CoreResult;

const ADD_PROMPT: &str = "New line content: ";
const CONTINUE_PROMPT: &str = "Press Enter to continue...";
const UNSAVED_PROMPT: &str = "You have unsaved changes. Save before exiting? (y/n): ";

/// Consecutive unreadable commands tolerated before input counts as closed.
const MAX_READ_FAILURES: usize = 3;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Reading and executing commands
    #[default]
    Running,
    /// `quit` was issued; no more commands are read
    Terminated,
}

/// One editing session over one buffer.
///
/// ## Invariant
///
/// `cursor` is `Some(i)` with `i < buffer.len()` whenever the buffer has
/// lines, and `None` exactly when it is empty.
pub struct Session<S: Storage, C: Console, D: Diagnostics> {
    /// The lines being edited
    buffer: Buffer<S>,

    /// Index of the current line (None while the buffer is empty)
    cursor: Option<usize>,

    state: SessionState,

    /// Set once the exit dirty-check has run
    finished: bool,

    console: C,

    diagnostics: D,

    config: EditorConfig,
}

impl<S: Storage, C: Console, D: Diagnostics> Session<S, C, D> {
    /// Creates a session over an already loaded buffer.
    ///
    /// The cursor starts on the last line.
    pub fn new(buffer: Buffer<S>, console: C, diagnostics: D, config: EditorConfig) -> Self {
        let cursor = buffer.len().checked_sub(1);
        Self {
            buffer,
            cursor,
            state: SessionState::Running,
            finished: false,
            console,
            diagnostics,
            config,
        }
    }

    /// Opens `path` (or an unbound in-memory buffer) and starts a session.
    ///
    /// A missing file is created empty rather than reported as an error.
    pub fn open(
        path: Option<&Path>,
        storage: S,
        console: C,
        diagnostics: D,
        config: EditorConfig,
    ) -> CoreResult<Self> {
        let buffer = match path {
            Some(path) => {
                let (buffer, outcome) = Buffer::open(path, storage).inspect_err(|err| {
                    diagnostics.fatal(&format!("Cannot open {}: {err}", path.display()));
                })?;
                match outcome {
                    LoadOutcome::Created => diagnostics.debug(&format!(
                        "File {} does not exist. Creating a new file.",
                        path.display()
                    )),
                    LoadOutcome::Opened => diagnostics
                        .info(&format!("Opening file {} for editing.", path.display())),
                }
                diagnostics.info(&format!("Editing file: {}", path.display()));
                buffer
            }
            None => {
                diagnostics.info("Editing an in-memory buffer with no file.");
                Buffer::new(storage)
            }
        };

        Ok(Self::new(buffer, console, diagnostics, config))
    }

    // ==================== Getters ====================

    pub fn buffer(&self) -> &Buffer<S> {
        &self.buffer
    }

    /// Returns the cursor index, or None when the buffer is empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Ends the session, handing the buffer back.
    pub fn into_buffer(self) -> Buffer<S> {
        self.buffer
    }

    // ==================== Loop ====================

    /// Runs the command loop until `quit` or end of input, then performs
    /// the exit dirty-check.
    ///
    /// Storage failures end the loop and are returned; everything else is
    /// logged and the loop carries on. An unreadable command is rejected
    /// like an unknown one. After repeated read failures input counts as
    /// closed, so the exit check still runs.
    pub fn run(&mut self) -> CoreResult<()> {
        let mut read_failures = 0;
        while self.is_running() {
            self.draw()?;

            let input = match self.console.read_line(&self.config.prompt) {
                Ok(input) => {
                    read_failures = 0;
                    input
                }
                Err(err) => {
                    read_failures += 1;
                    self.diagnostics
                        .warn(&format!("Cannot read command: {err}"));
                    if read_failures < MAX_READ_FAILURES {
                        continue;
                    }
                    None
                }
            };

            let Some(input) = input else {
                self.diagnostics.debug("Input closed.");
                self.execute(Command::Quit)?;
                break;
            };

            let parts: Vec<&str> = input.split_whitespace().collect();
            self.diagnostics.debug(&format!("Command parts: {parts:?}"));

            self.execute(Command::parse(&input))?;
        }

        self.finish()
    }

    /// Clears the screen and draws the context window.
    pub fn draw(&mut self) -> CoreResult<()> {
        if self.config.clear_screen {
            self.console.clear()?;
        }

        let context = context_size(self.console.rows(), self.config.min_context);
        for line in render(
            &self.buffer,
            self.cursor,
            context,
            self.config.highlight_cursor_line,
        ) {
            self.console.write_line(&line)?;
        }
        Ok(())
    }

    /// Executes a single command.
    pub fn execute(&mut self, command: Command) -> CoreResult<()> {
        let mutation = command.is_mutation();
        self.diagnostics
            .debug(&format!("Dispatching {}", command.display_name()));

        match command {
            Command::Quit => self.quit(),
            Command::Up(step) => self.move_up(step),
            Command::Down(step) => self.move_down(step),
            Command::Add { text } => self.add(text)?,
            Command::Newline => self.add(Some(String::new()))?,
            Command::Edit { text } => self.edit(text)?,
            Command::Remove => self.remove(),
            Command::Save => self.save()?,
            Command::Help => self.help()?,
            Command::Empty => self.diagnostics.debug("Empty command, nothing to do."),
            Command::Unknown(input) => {
                self.diagnostics.warn(&format!("Unknown command: {input}"));
            }
        }

        if mutation {
            self.diagnostics.debug(&format!(
                "Buffer has {} lines, cursor at {:?}",
                self.buffer.len(),
                self.cursor
            ));
        }
        Ok(())
    }

    // ==================== Commands ====================

    fn quit(&mut self) {
        self.diagnostics.info("Exiting editor.");
        self.state = SessionState::Terminated;
    }

    fn move_up(&mut self, step: Step) {
        let Some(cursor) = self.cursor else {
            self.diagnostics.debug("Cannot move up: buffer is empty.");
            return;
        };

        self.cursor = Some(match step {
            Step::ToEdge => 0,
            Step::Count(n) => cursor.saturating_sub(n),
        });
    }

    fn move_down(&mut self, step: Step) {
        let (Some(cursor), Some(last)) = (self.cursor, self.buffer.len().checked_sub(1)) else {
            self.diagnostics.debug("Cannot move down: buffer is empty.");
            return;
        };

        self.cursor = Some(match step {
            Step::ToEdge => last,
            Step::Count(n) => cursor.saturating_add(n).min(last),
        });
    }

    /// Inserts a line after the cursor and moves onto it.
    fn add(&mut self, text: Option<String>) -> CoreResult<()> {
        let text = match text {
            Some(text) => text,
            None => match self.console.read_line(ADD_PROMPT)? {
                Some(text) => text,
                None => {
                    self.diagnostics.debug("Add cancelled: input closed.");
                    return Ok(());
                }
            },
        };

        let index = self.cursor.map_or(0, |cursor| cursor + 1);
        let index = self.buffer.insert(index, text);
        self.cursor = Some(index);
        Ok(())
    }

    /// Replaces the text of the cursor line.
    ///
    /// Without inline text the user is prompted with the current content;
    /// an empty answer keeps it.
    fn edit(&mut self, text: Option<String>) -> CoreResult<()> {
        let Some(cursor) = self.cursor else {
            self.diagnostics.debug("Nothing to edit: buffer is empty.");
            return Ok(());
        };

        let text = match text {
            Some(text) => text,
            None => {
                let current = self
                    .buffer
                    .line(cursor)
                    .map(|line| line.text().to_string())
                    .unwrap_or_default();
                match self.console.read_line(&format!("E ({current}) / "))? {
                    Some(text) if !text.is_empty() => text,
                    _ => {
                        self.diagnostics
                            .debug(&format!("Line {} left unchanged.", cursor + 1));
                        return Ok(());
                    }
                }
            }
        };

        self.buffer.set_text(cursor, text);
        Ok(())
    }

    /// Deletes the cursor line, keeping the cursor in range.
    fn remove(&mut self) {
        let Some(cursor) = self.cursor else {
            self.diagnostics.debug("Nothing to remove: buffer is empty.");
            return;
        };

        self.buffer.remove(cursor);
        self.cursor = self
            .buffer
            .len()
            .checked_sub(1)
            .map(|last| cursor.min(last));
    }

    fn save(&mut self) -> CoreResult<()> {
        if let Err(err) = self.buffer.save() {
            let target = self
                .buffer
                .path()
                .map_or_else(|| "<no file>".to_string(), |p| p.display().to_string());
            self.diagnostics
                .fatal(&format!("Failed to save {target}: {err}"));
            return Err(err.into());
        }

        if let Some(path) = self.buffer.path() {
            self.diagnostics
                .info(&format!("File {} saved.", path.display()));
        }
        Ok(())
    }

    fn help(&mut self) -> CoreResult<()> {
        self.console.write_line("Commands:")?;
        for (usage, description) in HELP {
            self.console
                .write_line(&format!("  {usage:<16} - {description}"))?;
        }
        self.console.read_line(CONTINUE_PROMPT)?;
        Ok(())
    }

    // ==================== Exit ====================

    /// Offers to save unsaved changes. Runs at most once per session.
    fn finish(&mut self) -> CoreResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let dirty = self.buffer.is_dirty().inspect_err(|err| {
            self.diagnostics
                .fatal(&format!("Cannot check for unsaved changes: {err}"));
        })?;
        if !dirty {
            return Ok(());
        }

        let answer = self.console.read_line(UNSAVED_PROMPT)?.unwrap_or_default();
        if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            self.save()
        } else {
            self.diagnostics.info("Discarding unsaved changes.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    use crate::console::ScriptedConsole;
    use crate::diagnostics::{Level, RecordingDiagnostics};
    use crate::CoreError;
    use medit_buffer::{BufferError, MemoryStorage};

    type TestSession = Session<MemoryStorage, ScriptedConsole, RecordingDiagnostics>;

    fn config() -> EditorConfig {
        EditorConfig {
            highlight_cursor_line: false,
            ..EditorConfig::default()
        }
    }

    /// A session over `doc.txt` holding `lines`, answering prompts with `input`.
    fn session(lines: &[&str], input: &[&str]) -> (TestSession, MemoryStorage) {
        let storage = MemoryStorage::new();
        let content: String = lines.iter().map(|l| format!("{l}\n")).collect();
        storage.insert_file("doc.txt", content);

        let session = Session::open(
            Some(Path::new("doc.txt")),
            storage.clone(),
            ScriptedConsole::new(input.iter().copied()),
            RecordingDiagnostics::new(),
            config(),
        )
        .unwrap();
        (session, storage)
    }

    fn unbound(input: &[&str]) -> TestSession {
        Session::open(
            None,
            MemoryStorage::new(),
            ScriptedConsole::new(input.iter().copied()),
            RecordingDiagnostics::new(),
            config(),
        )
        .unwrap()
    }

    fn run(session: &mut TestSession, commands: &[&str]) {
        for command in commands {
            session.execute(Command::parse(command)).unwrap();
        }
    }

    #[test]
    fn test_cursor_starts_at_last_line() {
        let (s, _) = session(&["a", "b", "c"], &[]);
        assert_eq!(s.cursor(), Some(2));
        assert!(s.is_running());

        let s = unbound(&[]);
        assert_eq!(s.cursor(), None);
    }

    #[test]
    fn test_open_logs_created_file() {
        let storage = MemoryStorage::new();
        let s = Session::open(
            Some(Path::new("fresh.txt")),
            storage.clone(),
            ScriptedConsole::default(),
            RecordingDiagnostics::new(),
            config(),
        )
        .unwrap();

        assert!(storage.exists(Path::new("fresh.txt")));
        assert!(s.diagnostics().messages(Level::Debug)[0].contains("does not exist"));
        assert_eq!(
            s.diagnostics().messages(Level::Info),
            vec!["Editing file: fresh.txt".to_string()]
        );
    }

    #[test]
    fn test_cursor_clamping() {
        let (mut s, _) = session(&["1", "2", "3", "4", "5"], &[]);
        assert_eq!(s.cursor(), Some(4));

        run(&mut s, &["down"]);
        assert_eq!(s.cursor(), Some(4));

        run(&mut s, &["up 100"]);
        assert_eq!(s.cursor(), Some(0));

        run(&mut s, &["up"]);
        assert_eq!(s.cursor(), Some(0));

        run(&mut s, &["down -1"]);
        assert_eq!(s.cursor(), Some(4));

        run(&mut s, &["u -1"]);
        assert_eq!(s.cursor(), Some(0));

        run(&mut s, &["d 2", "d nonsense"]);
        assert_eq!(s.cursor(), Some(3));
    }

    #[test]
    fn test_navigation_on_empty_buffer_is_noop() {
        let mut s = unbound(&[]);
        run(&mut s, &["up", "down -1"]);
        assert_eq!(s.cursor(), None);
    }

    #[test]
    fn test_add_inserts_after_cursor() {
        let (mut s, _) = session(&["first", "third"], &[]);
        run(&mut s, &["up", "add second line"]);

        assert_eq!(s.buffer().texts(), vec!["first", "second line", "third"]);
        assert_eq!(s.cursor(), Some(1));
        assert_eq!(s.buffer().line(2).unwrap().position(), 3);
    }

    #[test]
    fn test_add_prompts_without_text() {
        let (mut s, _) = session(&["one"], &["Typed In Full"]);
        run(&mut s, &["a"]);

        assert_eq!(s.buffer().texts(), vec!["one", "Typed In Full"]);
        assert_eq!(s.console().prompts(), [ADD_PROMPT]);
    }

    #[test]
    fn test_add_cancelled_by_closed_input() {
        let (mut s, _) = session(&["one"], &[]);
        run(&mut s, &["add"]);
        assert_eq!(s.buffer().texts(), vec!["one"]);
        assert_eq!(s.cursor(), Some(0));
    }

    #[test]
    fn test_newline_never_prompts() {
        let (mut s, _) = session(&["one"], &[]);
        run(&mut s, &["n"]);
        assert_eq!(s.buffer().texts(), vec!["one", ""]);
        assert_eq!(s.cursor(), Some(1));
        assert!(s.console().prompts().is_empty());
    }

    #[test]
    fn test_edit_inline_and_prompted() {
        let (mut s, _) = session(&["old"], &["prompted"]);
        run(&mut s, &["edit brand new"]);
        assert_eq!(s.buffer().texts(), vec!["brand new"]);

        run(&mut s, &["e"]);
        assert_eq!(s.buffer().texts(), vec!["prompted"]);
        assert_eq!(s.console().prompts(), ["E (brand new) / "]);
    }

    #[test]
    fn test_edit_empty_answer_keeps_text() {
        let (mut s, _) = session(&["keep me"], &[""]);
        run(&mut s, &["edit"]);
        assert_eq!(s.buffer().texts(), vec!["keep me"]);
    }

    #[test]
    fn test_remove_clamps_cursor() {
        let (mut s, _) = session(&["a", "b", "c"], &[]);
        run(&mut s, &["remove"]);
        assert_eq!(s.buffer().texts(), vec!["a", "b"]);
        assert_eq!(s.cursor(), Some(1));

        run(&mut s, &["up", "r"]);
        assert_eq!(s.buffer().texts(), vec!["b"]);
        assert_eq!(s.cursor(), Some(0));
        assert_eq!(s.buffer().line(0).unwrap().position(), 1);
    }

    #[test]
    fn test_remove_last_line_then_noops() {
        let (mut s, _) = session(&["only"], &["should not be read"]);
        run(&mut s, &["remove"]);
        assert!(s.buffer().is_empty());
        assert_eq!(s.cursor(), None);

        run(&mut s, &["edit", "remove"]);
        assert!(s.buffer().is_empty());
        assert_eq!(s.cursor(), None);
        assert_eq!(s.console().remaining_input(), 1);
    }

    #[test]
    fn test_add_into_empty_buffer() {
        let mut s = unbound(&[]);
        run(&mut s, &["add hello"]);
        assert_eq!(s.buffer().texts(), vec!["hello"]);
        assert_eq!(s.cursor(), Some(0));
    }

    #[test]
    fn test_unknown_command_warns() {
        let (mut s, _) = session(&["a", "b"], &[]);
        run(&mut s, &["jump 3"]);

        assert_eq!(s.buffer().texts(), vec!["a", "b"]);
        assert_eq!(s.cursor(), Some(1));
        assert!(s.is_running());
        assert_eq!(
            s.diagnostics().messages(Level::Warn),
            vec!["Unknown command: jump 3".to_string()]
        );
    }

    #[test]
    fn test_save_writes_file() {
        let (mut s, storage) = session(&["a"], &[]);
        run(&mut s, &["add b", "save"]);

        assert_eq!(storage.content("doc.txt").as_deref(), Some("a\nb\n"));
        assert!(s.is_running());
        assert!(!s.buffer().is_dirty().unwrap());
        assert!(
            s.diagnostics()
                .messages(Level::Info)
                .contains(&"File doc.txt saved.".to_string())
        );
    }

    #[test]
    fn test_failed_save_is_fatal() {
        let (mut s, storage) = session(&["a"], &[]);
        storage.set_fail_writes(true);

        let result = s.execute(Command::Save);
        assert!(matches!(result, Err(CoreError::Buffer(BufferError::Io(_)))));
        assert_eq!(s.diagnostics().messages(Level::Fatal).len(), 1);
    }

    #[test]
    fn test_help_waits_for_acknowledgment() {
        let (mut s, _) = session(&["a"], &[""]);
        run(&mut s, &["help"]);

        let output = s.console().output();
        assert_eq!(output[0], "Commands:");
        assert_eq!(output.len(), HELP.len() + 1);
        assert_eq!(s.console().prompts(), [CONTINUE_PROMPT]);
        assert_eq!(s.cursor(), Some(0));
    }

    #[test]
    fn test_draw_renders_window() {
        let (mut s, _) = session(&["a", "b", "c"], &[]);
        run(&mut s, &["up"]);
        s.draw().unwrap();

        assert_eq!(s.console().clears(), 1);
        assert_eq!(s.console().output(), ["  1: a", "> 2: b", "  3: c"]);
    }

    #[test]
    fn test_run_clean_exit_skips_prompt() {
        let (mut s, _) = session(&["a"], &["up", "q"]);
        s.run().unwrap();

        assert_eq!(s.state(), SessionState::Terminated);
        assert_eq!(s.console().prompts(), ["::> ", "::> "]);
    }

    #[test]
    fn test_run_saves_on_confirmation() {
        let (mut s, storage) = session(&["a"], &["add b", "quit", "Y"]);
        s.run().unwrap();

        assert_eq!(storage.content("doc.txt").as_deref(), Some("a\nb\n"));
        assert_eq!(s.console().prompts().last().unwrap(), UNSAVED_PROMPT);
    }

    #[test]
    fn test_run_discards_on_refusal() {
        let (mut s, storage) = session(&["a"], &["remove", "quit", "n"]);
        s.run().unwrap();
        assert_eq!(storage.content("doc.txt").as_deref(), Some("a\n"));
    }

    #[test]
    fn test_run_treats_closed_input_as_quit() {
        let (mut s, _) = session(&["a"], &["add b"]);
        s.run().unwrap();
        assert_eq!(s.state(), SessionState::Terminated);
        assert_eq!(s.buffer().texts(), vec!["a", "b"]);
    }

    #[test]
    fn test_exit_check_runs_once() {
        let (mut s, _) = session(&["a"], &["add b", "quit", "n"]);
        s.run().unwrap();
        let prompts = s.console().prompts().len();

        s.run().unwrap();
        assert_eq!(s.console().prompts().len(), prompts);
    }

    #[test]
    fn test_end_to_end_unbound_buffer() {
        let mut s = unbound(&[]);
        run(&mut s, &["add hello"]);
        assert_eq!(s.buffer().texts(), vec!["hello"]);
        assert_eq!(s.cursor(), Some(0));

        run(&mut s, &["newline"]);
        assert_eq!(s.buffer().texts(), vec!["hello", ""]);
        assert_eq!(s.cursor(), Some(1));

        run(&mut s, &["edit world"]);
        assert_eq!(s.buffer().texts(), vec!["hello", "world"]);

        s.console.push_input("quit");
        s.console.push_input("y");
        let result = s.run();

        assert!(matches!(result, Err(CoreError::Buffer(BufferError::NoPath))));
        assert_eq!(s.diagnostics().messages(Level::Fatal).len(), 1);
    }

    /// Fails the first `failures` reads, then replays a script.
    struct FailingConsole {
        failures: usize,
        inner: ScriptedConsole,
    }

    impl Console for FailingConsole {
        fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "stream did not contain valid UTF-8",
                ));
            }
            self.inner.read_line(prompt)
        }

        fn write_line(&mut self, text: &str) -> io::Result<()> {
            self.inner.write_line(text)
        }

        fn clear(&mut self) -> io::Result<()> {
            self.inner.clear()
        }

        fn rows(&self) -> Option<u16> {
            self.inner.rows()
        }
    }

    fn failing_session(
        failures: usize,
        input: &[&str],
    ) -> (Session<MemoryStorage, FailingConsole, RecordingDiagnostics>, MemoryStorage) {
        let storage = MemoryStorage::new();
        storage.insert_file("doc.txt", "a\n");
        let console = FailingConsole {
            failures,
            inner: ScriptedConsole::new(input.iter().copied()),
        };
        let session = Session::open(
            Some(Path::new("doc.txt")),
            storage.clone(),
            console,
            RecordingDiagnostics::new(),
            config(),
        )
        .unwrap();
        (session, storage)
    }

    #[test]
    fn test_unreadable_command_is_rejected_and_loop_continues() {
        let (mut s, storage) = failing_session(0, &[]);
        s.execute(Command::parse("add important")).unwrap();
        s.console.failures = 1;
        s.console.inner.push_input("quit");
        s.console.inner.push_input("y");

        s.run().unwrap();

        assert_eq!(storage.content("doc.txt").as_deref(), Some("a\nimportant\n"));
        assert_eq!(s.console.inner.prompts().last().unwrap(), UNSAVED_PROMPT);
        assert_eq!(s.diagnostics().messages(Level::Warn).len(), 1);
        assert!(s.diagnostics().messages(Level::Fatal).is_empty());
    }

    #[test]
    fn test_repeated_read_failures_still_offer_save() {
        let (mut s, storage) = failing_session(0, &[]);
        s.execute(Command::parse("add b")).unwrap();
        s.console.failures = MAX_READ_FAILURES;
        s.console.inner.push_input("y");

        s.run().unwrap();

        assert_eq!(s.state(), SessionState::Terminated);
        assert_eq!(storage.content("doc.txt").as_deref(), Some("a\nb\n"));
        assert_eq!(
            s.diagnostics().messages(Level::Warn).len(),
            MAX_READ_FAILURES
        );
    }

    #[test]
    fn test_end_to_end_unbound_buffer_declined() {
        let mut s = unbound(&["add hello", "quit", "no"]);
        s.run().unwrap();
        assert_eq!(s.into_buffer().texts(), vec!["hello"]);
    }
}
