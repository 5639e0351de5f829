use crate::providers::{Message, Role};
use console::style;
use std::io::{self, Write};

/// Where replies, lookup results and user-facing errors are rendered.
///
/// `send` opens a new message; an empty `send` followed by `stream_token`
/// calls and a final `update` renders a streamed reply.
pub trait OutputSink: Send {
    fn send(&mut self, text: &str);
    fn stream_token(&mut self, token: &str);
    fn update(&mut self);
}

/// Renders the conversation on stdout.
pub struct TerminalSink {
    streaming: bool,
    ends_with_newline: bool,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            streaming: false,
            ends_with_newline: true,
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for TerminalSink {
    fn send(&mut self, text: &str) {
        if text.is_empty() {
            print!("\n{} ", style("🎬").bold().magenta());
            self.streaming = true;
            self.ends_with_newline = false;
        } else {
            println!("\n{} {}", style("🎬").bold().magenta(), style(text).white());
            self.streaming = false;
            self.ends_with_newline = true;
        }
        io::stdout().flush().ok();
    }

    fn stream_token(&mut self, token: &str) {
        print!("{}", token);
        io::stdout().flush().ok();
        self.ends_with_newline = token.ends_with('\n');
    }

    fn update(&mut self) {
        if self.streaming && !self.ends_with_newline {
            println!();
        }
        self.streaming = false;
        self.ends_with_newline = true;
    }
}

pub fn display_welcome(model: &str) {
    println!(
        "{} {}",
        style("🍿 reelchat").bold().magenta(),
        style(format!("({})", model)).dim()
    );
    println!(
        "{}",
        style("Ask about what's playing, showtimes or reviews. Type '/help' for commands, Ctrl+D or /quit to exit.")
            .dim()
    );
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("✖").bold().red(), style(message).red());
}

/// One line per message, system prompt abbreviated.
pub fn format_history(messages: &[Message]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(i, msg)| {
            let role = match msg.role {
                Role::System => style("system").dim(),
                Role::User => style("user").bold().cyan(),
                Role::Assistant => style("assistant").bold().magenta(),
            };
            let content = if msg.role == Role::System {
                msg.content.lines().next().unwrap_or_default().to_string() + " …"
            } else {
                msg.content.clone()
            };
            format!("{:>3} {}: {}", i, role, content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
