// SPDX-License-Identifier: MIT OR Apache-2.0
//! Activity log panel - recent tracing events shown under the route panel.

use std::collections::VecDeque;
use std::sync::mpsc;

/// Entries kept by default
const DEFAULT_MAX_ENTRIES: usize = 200;

/// A tracing event captured by the [`LogBridge`] layer.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// The log level.
    pub level: LogLevel,
    /// The formatted message.
    pub message: String,
    /// Module path that emitted the event.
    pub target: String,
}

/// A `tracing_subscriber::Layer` that forwards events over an `mpsc` channel
/// so the [`LogPanel`] can display them.
pub struct LogBridge {
    sender: mpsc::Sender<LogEvent>,
}

impl LogBridge {
    /// Create a new bridge and return `(layer, receiver)`.
    pub fn new() -> (Self, mpsc::Receiver<LogEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl<S> tracing_subscriber::Layer<S> for LogBridge
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        // The panel may already be gone during shutdown
        let _ = self.sender.send(LogEvent {
            level: LogLevel::from(*meta.level()),
            message: visitor.message,
            target: meta.target().to_string(),
        });
    }
}

/// Visitor that extracts the `message` field from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else if self.message.is_empty() {
            self.message = format!("{} = {:?}", field.name(), value);
        } else {
            self.message.push_str(&format!(", {} = {:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.record_debug(field, &value);
        }
    }
}

/// Log level for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Very verbose diagnostics
    Trace,
    /// Diagnostics
    Debug,
    /// Normal activity
    Info,
    /// Something looks wrong
    Warn,
    /// Something failed
    Error,
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        }
    }
}

impl LogLevel {
    fn all() -> &'static [LogLevel] {
        &[Self::Trace, Self::Debug, Self::Info, Self::Warn, Self::Error]
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    fn color(&self) -> egui::Color32 {
        match self {
            Self::Trace => egui::Color32::from_rgb(100, 100, 100),
            Self::Debug => egui::Color32::from_rgb(150, 150, 150),
            Self::Info => egui::Color32::from_rgb(200, 200, 200),
            Self::Warn => egui::Color32::from_rgb(255, 200, 80),
            Self::Error => egui::Color32::from_rgb(255, 100, 100),
        }
    }
}

/// A log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Level
    pub level: LogLevel,
    /// Message text
    pub message: String,
    /// Number of consecutive identical messages collapsed into this entry
    pub count: u32,
}

/// The activity log panel
pub struct LogPanel {
    /// Receiver for tracing events
    receiver: Option<mpsc::Receiver<LogEvent>>,
    /// Log entries, oldest first
    entries: VecDeque<LogEntry>,
    /// Maximum entries to keep
    pub max_entries: usize,
    /// Minimum log level to show
    pub min_level: LogLevel,
}

impl LogPanel {
    /// Create a new log panel wired to a tracing receiver.
    pub fn new(receiver: Option<mpsc::Receiver<LogEvent>>) -> Self {
        Self {
            receiver,
            entries: VecDeque::new(),
            max_entries: DEFAULT_MAX_ENTRIES,
            min_level: LogLevel::Info,
        }
    }

    /// Entries currently kept
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Add a log entry, collapsing it into the previous one if identical
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();

        if let Some(last) = self.entries.back_mut() {
            if last.level == level && last.message == message {
                last.count += 1;
                return;
            }
        }

        self.entries.push_back(LogEntry {
            level,
            message,
            count: 1,
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Move pending tracing events into the panel
    pub fn drain_events(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };
        let pending: Vec<LogEvent> = receiver.try_iter().collect();
        for event in pending {
            // Skip GPU backend chatter
            if event.target.starts_with("wgpu") || event.target.starts_with("naga") {
                continue;
            }
            self.log(event.level, event.message);
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render the log panel
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.drain_events();

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Activity").strong());
            egui::ComboBox::from_id_salt("log_min_level")
                .selected_text(self.min_level.name())
                .width(70.0)
                .show_ui(ui, |ui| {
                    for level in LogLevel::all() {
                        ui.selectable_value(&mut self.min_level, *level, level.name());
                    }
                });
            if ui.small_button("Clear").clicked() {
                self.clear();
            }
        });

        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in self.entries().filter(|e| e.level >= self.min_level) {
                    let text = if entry.count > 1 {
                        format!("{} (x{})", entry.message, entry.count)
                    } else {
                        entry.message.clone()
                    };
                    ui.label(
                        egui::RichText::new(text)
                            .monospace()
                            .size(11.0)
                            .color(entry.level.color()),
                    );
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let mut panel = LogPanel::new(None);
        panel.log(LogLevel::Info, "Route found");
        panel.log(LogLevel::Info, "Route found");
        panel.log(LogLevel::Warn, "Route found");

        let entries: Vec<_> = panel.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].count, 2);
        assert_eq!(entries[1].level, LogLevel::Warn);
    }

    #[test]
    fn test_entries_bounded() {
        let mut panel = LogPanel::new(None);
        panel.max_entries = 3;
        for i in 0..5 {
            panel.log(LogLevel::Info, format!("entry {i}"));
        }

        let messages: Vec<_> = panel.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["entry 2", "entry 3", "entry 4"]);
    }

    #[test]
    fn test_drain_filters_backend_targets() {
        let (bridge, receiver) = LogBridge::new();
        let mut panel = LogPanel::new(Some(receiver));

        for (target, message) in [("wgpu_core::device", "adapter"), ("station_map_app", "ready")] {
            bridge
                .sender
                .send(LogEvent {
                    level: LogLevel::Info,
                    message: message.to_string(),
                    target: target.to_string(),
                })
                .unwrap();
        }
        panel.drain_events();

        let messages: Vec<_> = panel.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["ready"]);
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(LogLevel::from(tracing::Level::WARN), LogLevel::Warn);
        assert!(LogLevel::Error > LogLevel::Info);
    }
}
