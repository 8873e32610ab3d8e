//! Diagnostic sink injected into a [`FileIndex`](super::FileIndex).
//!
//! The index never logs through a global on its own: it reports through the
//! sink it was constructed with, and drops messages when it has none. The
//! CLI installs [`LogSink`], which forwards to the `log` facade.

use log::Level;

/// Receiver for leveled diagnostic messages.
pub trait DiagnosticSink: Send + Sync {
    /// Record one message.
    fn log(&self, level: Level, message: &str);
}

/// Forwards diagnostics to the `log` crate under the `dupecache::cache`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: "dupecache::cache", level, "{}", message);
    }
}
