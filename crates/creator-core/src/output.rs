//! User-facing messages for one invocation
//!
//! Every message is recorded (so the API can return it) and mirrored to
//! `tracing` under the `creator_output` target. Terminal echo is optional.

use colored::Colorize;
use serde::Serialize;
use std::fmt;

/// Target used for the tracing events mirrored from [`Output`]
pub const OUTPUT_TARGET: &str = "creator_output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Critical,
    Debug,
    Error,
    Hint,
    Info,
    Note,
    Warning,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::Critical => "Critical",
            Level::Debug => "Debug",
            Level::Error => "Error",
            Level::Hint => "Hint",
            Level::Info => "Info",
            Level::Note => "Note",
            Level::Warning => "Warning",
        }
    }

    /// Verbosity needed before the message is kept at all
    fn min_verbosity(&self) -> u8 {
        match self {
            Level::Debug => 2,
            Level::Info => 1,
            _ => 0,
        }
    }

    fn is_problem(&self) -> bool {
        matches!(self, Level::Critical | Level::Error | Level::Warning)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Message sink scoped to a single invocation
#[derive(Debug, Clone)]
pub struct Output {
    verbosity: u8,
    echo: bool,
    color: bool,
    messages: Vec<Message>,
}

impl Output {
    /// Record messages without printing them
    pub fn capture(verbosity: u8) -> Self {
        Self {
            verbosity,
            echo: false,
            color: false,
            messages: Vec::new(),
        }
    }

    /// Record messages and print them as they arrive
    pub fn terminal(verbosity: u8, color: bool) -> Self {
        Self {
            verbosity,
            echo: true,
            color,
            messages: Vec::new(),
        }
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn debug(&mut self, msg: impl Into<String>) {
        self.log(Level::Debug, msg.into());
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        self.log(Level::Info, msg.into());
    }

    pub fn note(&mut self, msg: impl Into<String>) {
        self.log(Level::Note, msg.into());
    }

    pub fn hint(&mut self, msg: impl Into<String>) {
        self.log(Level::Hint, msg.into());
    }

    pub fn warning(&mut self, msg: impl Into<String>) {
        self.log(Level::Warning, msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.log(Level::Error, msg.into());
    }

    pub fn critical(&mut self, msg: impl Into<String>) {
        self.log(Level::Critical, msg.into());
    }

    fn log(&mut self, level: Level, message: String) {
        match level {
            Level::Debug => tracing::debug!(target: OUTPUT_TARGET, "{}", message),
            Level::Info | Level::Note | Level::Hint => {
                tracing::info!(target: OUTPUT_TARGET, level = level.label(), "{}", message)
            }
            Level::Warning => tracing::warn!(target: OUTPUT_TARGET, "{}", message),
            Level::Error | Level::Critical => tracing::error!(target: OUTPUT_TARGET, "{}", message),
        }

        if self.verbosity < level.min_verbosity() {
            return;
        }

        let msg = Message { level, message };
        if self.echo {
            self.print(&msg);
        }
        self.messages.push(msg);
    }

    fn print(&self, msg: &Message) {
        let prefix = format!("{}:", msg.level);
        let prefix = if self.color {
            match msg.level {
                Level::Critical | Level::Error => prefix.red().bold().to_string(),
                Level::Warning => prefix.yellow().bold().to_string(),
                Level::Note => prefix.green().bold().to_string(),
                Level::Hint => prefix.cyan().bold().to_string(),
                Level::Info => prefix.blue().to_string(),
                Level::Debug => prefix.dimmed().to_string(),
            }
        } else {
            prefix
        };

        if msg.level.is_problem() {
            eprintln!("{} {}", prefix, msg.message);
        } else {
            println!("{} {}", prefix, msg.message);
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages rendered as `"<Level>: <message>"`
    pub fn lines(&self) -> Vec<String> {
        self.messages.iter().map(Message::to_string).collect()
    }

    /// Text of the most recent note, used as a summary message
    pub fn last_note(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.level == Level::Note)
            .map(|m| m.message.as_str())
    }
}
