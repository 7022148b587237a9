//! Human-readable event output

use is_terminal::IsTerminal;

use crossterm::style::{Color, Stylize};

use super::theme::{colors, icons, icons_ascii};
use super::{EventSink, TaskEvent};

/// Prints events for a terminal user.
///
/// Verbosity 0 shows operation results, 1 adds written files and file
/// changes, 2 adds operation starts.
pub struct ConsoleEventSink {
    verbosity: u8,
    color: bool,
    unicode: bool,
}

impl ConsoleEventSink {
    pub fn new(verbosity: u8) -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self {
            verbosity,
            color,
            unicode: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }

    fn icon(&self, unicode: &'static str, ascii: &'static str) -> &'static str {
        if self.unicode {
            unicode
        } else {
            ascii
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Render an event to a line, or `None` if hidden at this verbosity.
    pub fn render(&self, event: &TaskEvent) -> Option<String> {
        let line = match event {
            TaskEvent::RunStarted { tasks } => {
                if self.verbosity < 1 {
                    return None;
                }
                format!(
                    "{} Running {}",
                    self.paint(self.icon(icons::PROGRESS, icons_ascii::PROGRESS), colors::INFO),
                    tasks.join(", ")
                )
            }
            TaskEvent::OperationStarted { task } => {
                if self.verbosity < 2 {
                    return None;
                }
                format!(
                    "{} {}",
                    self.paint(self.icon(icons::PROGRESS, icons_ascii::PROGRESS), colors::DIM),
                    task
                )
            }
            TaskEvent::FileWritten { path, .. } => {
                if self.verbosity < 1 {
                    return None;
                }
                format!(
                    "  {} {}",
                    self.paint(self.icon(icons::ARROW, icons_ascii::ARROW), colors::DIM),
                    path
                )
            }
            TaskEvent::OperationFinished {
                task,
                files,
                duration_ms,
            } => format!(
                "{} {} ({} files, {} ms)",
                self.paint(self.icon(icons::SUCCESS, icons_ascii::SUCCESS), colors::SUCCESS),
                task,
                files,
                duration_ms
            ),
            TaskEvent::OperationFailed { task, error } => format!(
                "{} {}: {}",
                self.paint(self.icon(icons::ERROR, icons_ascii::ERROR), colors::ERROR),
                task,
                error
            ),
            TaskEvent::OperationSkipped { task, reason } => format!(
                "{} {} skipped: {}",
                self.paint(self.icon(icons::WARNING, icons_ascii::WARNING), colors::WARNING),
                task,
                reason
            ),
            TaskEvent::RunFinished {
                succeeded,
                failed,
                skipped,
            } => {
                if self.verbosity < 1 && *failed == 0 && *skipped == 0 {
                    return None;
                }
                format!(
                    "Summary: {} succeeded, {} failed, {} skipped",
                    succeeded, failed, skipped
                )
            }
            TaskEvent::WatchStarted { task, paths } => format!(
                "{} {} watching {}",
                self.paint(self.icon(icons::WATCH, icons_ascii::WATCH), colors::INFO),
                task,
                paths.join(", ")
            ),
            TaskEvent::FileChanged { path } => {
                if self.verbosity < 1 {
                    return None;
                }
                format!("  Changed: {}", path)
            }
            TaskEvent::Reload => format!(
                "{} Reloading browsers",
                self.paint(self.icon(icons::WATCH, icons_ascii::WATCH), colors::INFO)
            ),
            TaskEvent::CssInjected { path } => format!(
                "{} Injected {}",
                self.paint(self.icon(icons::WATCH, icons_ascii::WATCH), colors::INFO),
                path
            ),
            TaskEvent::ServerListening { url, proxy } => format!(
                "{} Proxying {} at {}",
                self.paint(self.icon(icons::SERVER, icons_ascii::SERVER), colors::INFO),
                proxy,
                url
            ),
            TaskEvent::Error { message } => format!(
                "{} {}",
                self.paint(self.icon(icons::ERROR, icons_ascii::ERROR), colors::ERROR),
                message
            ),
            TaskEvent::Shutdown => "Shutting down...".to_string(),
        };
        Some(line)
    }
}

impl EventSink for ConsoleEventSink {
    fn on_event(&self, event: TaskEvent) {
        let is_error = matches!(
            event,
            TaskEvent::OperationFailed { .. } | TaskEvent::Error { .. }
        );
        if let Some(line) = self.render(&event) {
            if is_error {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
    }
}
