//! User-visible notices as an injected capability.
//!
//! Every component that must surface an outcome takes a `dyn Notifier`
//! rather than reaching for ambient global state; the hosting
//! application decides what a notice looks like (toast, terminal line,
//! test buffer).

/// How loud a notice should be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Fire-and-forget observer for user-visible outcomes and errors.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Routes notices through the log facade.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => log::error!("[notice] {}", message),
            Severity::Success => log::info!("[notice] {}", message),
            Severity::Info => log::info!("[notice] {}", message),
        }
    }
}
