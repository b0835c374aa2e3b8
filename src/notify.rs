use std::sync::Mutex;
use tracing::info;

/// How a message reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Screen-reader style status line. Quiet, replaces the previous one.
    Announcement,
    /// Transient on-screen toast. Also announced.
    Notification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

/// Sink for accessibility announcements and transient notifications.
pub trait Notifier: Send + Sync {
    fn announce(&self, message: &str);

    fn notify(&self, message: &str);
}

/// Writes notifications to stderr and announcements to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn announce(&self, message: &str) {
        info!(target: "recipe_finder::announce", "{}", message);
    }

    fn notify(&self, message: &str) {
        info!(target: "recipe_finder::announce", "{}", message);
        eprintln!("! {}", message);
    }
}

/// Buffers messages until drained. The shell prints them after each command.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<Message>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: MessageKind, text: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(Message {
                kind,
                text: text.to_string(),
            });
        }
    }

    pub fn drain(&self) -> Vec<Message> {
        self.messages
            .lock()
            .map(|mut messages| std::mem::take(&mut *messages))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Most recent announcement text, the way a live region would read it.
    pub fn last_announcement(&self) -> Option<String> {
        self.snapshot().last().map(|m| m.text.clone())
    }

    pub fn notifications(&self) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .filter(|m| m.kind == MessageKind::Notification)
            .map(|m| m.text)
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn announce(&self, message: &str) {
        self.push(MessageKind::Announcement, message);
    }

    fn notify(&self, message: &str) {
        self.push(MessageKind::Notification, message);
    }
}
