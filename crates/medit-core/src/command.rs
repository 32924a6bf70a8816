//! Command parsing for the editing loop.
//!
//! ## Learning: Closed Enums over String Matching
//!
//! Every line typed at the prompt becomes exactly one [`Command`]. The
//! session then matches on the enum exhaustively, so adding a command
//! means the compiler points at every place that must handle it. Input
//! that names no command is still a value, [`Command::Unknown`], rather
//! than a fallthrough branch.

/// How far an `up`/`down` command moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Move by this many lines (clamped to the buffer)
    Count(usize),
    /// Jump all the way to the first or last line
    ToEdge,
}

impl Step {
    /// Parses the optional count argument.
    ///
    /// `-1` means "to the edge". A missing, negative or non-numeric count
    /// falls back to a single line.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg.map(str::parse::<i64>) {
            Some(Ok(-1)) => Step::ToEdge,
            Some(Ok(n)) => usize::try_from(n).map_or(Step::Count(1), Step::Count),
            _ => Step::Count(1),
        }
    }
}

/// A parsed editor command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Leave the editing loop
    Quit,
    /// Move the cursor towards the start of the buffer
    Up(Step),
    /// Move the cursor towards the end of the buffer
    Down(Step),
    /// Insert a line after the cursor (prompts when `text` is None)
    Add { text: Option<String> },
    /// Insert an empty line after the cursor
    Newline,
    /// Replace the text of the cursor line (prompts when `text` is None)
    Edit { text: Option<String> },
    /// Delete the cursor line
    Remove,
    /// Write the buffer to its file
    Save,
    /// Show the command reference
    Help,
    /// Blank input
    Empty,
    /// Anything else; carries the trimmed input
    Unknown(String),
}

/// Command reference shown by `help`.
pub const HELP: &[(&str, &str)] = &[
    ("q, quit", "Exit the editor"),
    ("u, up [N]", "Move cursor up N lines (-1 jumps to the first line)"),
    ("d, down [N]", "Move cursor down N lines (-1 jumps to the last line)"),
    ("a, add [TEXT]", "Add a new line after the cursor"),
    ("e, edit [TEXT]", "Edit the current line"),
    ("r, remove", "Delete the current line"),
    ("s, save", "Save the file"),
    ("n, newline", "Add an empty line after the cursor, without prompting"),
    ("h, help", "Show this help message"),
];

impl Command {
    /// Parses one line of input.
    ///
    /// The first whitespace-separated word picks the command, ignoring
    /// case. Remaining words are rejoined with single spaces to form the
    /// free-text argument of `add` and `edit`.
    pub fn parse(input: &str) -> Self {
        let mut words = input.split_whitespace();
        let Some(head) = words.next() else {
            return Command::Empty;
        };
        let rest: Vec<&str> = words.collect();
        let text = (!rest.is_empty()).then(|| rest.join(" "));

        match head.to_lowercase().as_str() {
            "q" | "quit" => Command::Quit,
            "u" | "up" => Command::Up(Step::from_arg(rest.first().copied())),
            "d" | "down" => Command::Down(Step::from_arg(rest.first().copied())),
            "a" | "add" => Command::Add { text },
            "n" | "newline" => Command::Newline,
            "e" | "edit" => Command::Edit { text },
            "r" | "remove" => Command::Remove,
            "s" | "save" => Command::Save,
            "h" | "help" => Command::Help,
            _ => Command::Unknown(input.trim().to_string()),
        }
    }

    /// Returns the command's display name.
    pub fn display_name(&self) -> &str {
        match self {
            Command::Quit => "Quit",
            Command::Up(_) => "Move Up",
            Command::Down(_) => "Move Down",
            Command::Add { .. } => "Add Line",
            Command::Newline => "New Line",
            Command::Edit { .. } => "Edit Line",
            Command::Remove => "Remove Line",
            Command::Save => "Save",
            Command::Help => "Help",
            Command::Empty => "Empty",
            Command::Unknown(_) => "Unknown",
        }
    }

    /// Returns true if the command can change the buffer's text or shape.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::Add { .. } | Command::Newline | Command::Edit { .. } | Command::Remove
        )
    }
}
