//! Terminal emulator demo.
//!
//! Commands run locally against a tiny built-in command set. The remote
//! session transport does not exist yet: the scope carries a
//! `terminal.connection` handle that always reports the feature disabled.

use tracing::debug;

use super::{Widget, WidgetError, WidgetEvent, escape_html};
use crate::scope::{ScopeResource, SessionScope};

pub const PROMPT: &str = "guest@portfolio:~$";
pub const CONNECTION_RESOURCE: &str = "terminal.connection";
const MAX_SCROLLBACK: usize = 200;
const GREETING: &str = "Type 'help' to list available commands.";

/// Placeholder for the remote session transport.
#[derive(Debug, Default)]
pub struct TerminalConnection {
    closed: bool,
}

impl TerminalConnection {
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ScopeResource for TerminalConnection {
    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            debug!("terminal connection released");
        }
    }
}

#[derive(Debug)]
pub struct TerminalWidget {
    scrollback: Vec<String>,
}

impl Default for TerminalWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalWidget {
    #[must_use]
    pub fn new() -> Self {
        Self { scrollback: vec![GREETING.to_string()] }
    }

    #[must_use]
    pub fn scrollback(&self) -> &[String] {
        &self.scrollback
    }

    fn run(&mut self, line: &str, scope: &SessionScope) {
        let line = line.trim();
        self.push(format!("{PROMPT} {line}"));

        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match command {
            "" => {}
            "help" => self.push("commands: help, whoami, about, echo <text>, clear, connect".to_string()),
            "whoami" => self.push("guest".to_string()),
            "about" => {
                let title = scope.get("widget.title").and_then(serde_json::Value::as_str).unwrap_or("Terminal");
                self.push(format!("{title}: a terminal emulator running in your browser."));
            }
            "echo" => self.push(rest.trim().to_string()),
            "clear" => self.scrollback.clear(),
            "connect" => self.push("connect: remote sessions are not available yet (feature disabled)".to_string()),
            other => self.push(format!("command not found: {other}")),
        }
    }

    fn push(&mut self, line: String) {
        self.scrollback.push(line);
        if self.scrollback.len() > MAX_SCROLLBACK {
            let overflow = self.scrollback.len() - MAX_SCROLLBACK;
            self.scrollback.drain(..overflow);
        }
    }
}

impl Widget for TerminalWidget {
    fn render(&mut self, scope: &mut SessionScope) -> Result<String, WidgetError> {
        if !scope.has_resource(CONNECTION_RESOURCE) {
            scope.attach(CONNECTION_RESOURCE, Box::new(TerminalConnection::default()));
        }

        let screen = self.scrollback.iter().map(|l| escape_html(l)).collect::<Vec<_>>().join("\n");
        Ok(format!(
            "<div class=\"terminal\" data-connection=\"disabled\">\
             <pre class=\"terminal__screen\">{screen}</pre>\
             <form class=\"terminal__input\" data-event=\"input\">\
             <span class=\"terminal__prompt\">{prompt}</span>\
             <input name=\"line\" autocomplete=\"off\" spellcheck=\"false\">\
             </form></div>",
            prompt = escape_html(PROMPT),
        ))
    }

    fn handle_event(&mut self, event: &WidgetEvent, scope: &mut SessionScope) -> Result<(), WidgetError> {
        match event.name.as_str() {
            "input" => {
                let line = event.str_field("line")?.to_string();
                self.run(&line, scope);
            }
            "clear" => self.scrollback.clear(),
            other => debug!(event = other, "terminal ignored unknown event"),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;
