use std::sync::Arc;
use tracing::{error, info, warn};

/// Severity of a user-visible notice. Matches the toast levels of the web
/// frontend this core was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Sink for non-blocking user notifications. The host UI renders these;
/// nothing in the core ever blocks on one.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Shared handle over a notifier, passed from the composition root.
#[derive(Clone)]
pub struct Notices {
    sink: Arc<dyn Notifier>,
}

impl Notices {
    pub fn new(sink: Arc<dyn Notifier>) -> Self {
        Self { sink }
    }

    /// Notifier that renders notices as log lines. Default for headless use.
    pub fn to_log() -> Self {
        Self::new(Arc::new(LogNotifier))
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NoticeKind::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(NoticeKind::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into());
    }

    fn push(&self, kind: NoticeKind, message: String) {
        self.sink.notify(Notice { kind, message });
    }
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info | NoticeKind::Success => info!("{}", notice.message),
            NoticeKind::Warning => warn!("{}", notice.message),
            NoticeKind::Error => error!("{}", notice.message),
        }
    }
}
