// src/notifier.rs

//! Best-effort desktop notifications about sync outcomes.

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Title used for every notification.
pub const NOTIFICATION_TITLE: &str = "syncwatch";

/// Something that can show a `{title, message}` pair to the user.
///
/// Implementations should not block for long; the worker calls them inline
/// between two destinations.
pub trait Notifier: Send + Sync {
    fn send(&self, title: &str, message: &str) -> Result<()>;
}

/// Shows notifications through the OS notification service (`notify-rust`).
///
/// Each notification is delivered from a detached thread so a slow or absent
/// notification daemon never holds up the worker.
#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn send(&self, title: &str, message: &str) -> Result<()> {
        let title = title.to_string();
        let message = message.to_string();

        std::thread::Builder::new()
            .name("notify".to_string())
            .spawn(move || {
                let shown = notify_rust::Notification::new()
                    .summary(&title)
                    .body(&message)
                    .show();
                match shown {
                    Ok(_) => debug!(%message, "notification shown"),
                    Err(err) => warn!(error = %err, "failed to show desktop notification"),
                }
            })
            .context("spawning notification thread")?;

        Ok(())
    }
}

/// Message for a destination that synced successfully.
pub fn success_message(repo: &str, destination: &str) -> String {
    format!("{repo} synchronized to {destination}")
}

/// Message for a failed destination, carrying the tool's diagnostic verbatim.
pub fn failure_message(repo: &str, destination: &str, error: &str) -> String {
    format!("{repo} synchronization to {destination} failed with error {error}")
}

/// Send a notification, logging and swallowing any failure.
pub fn notify_best_effort(notifier: &dyn Notifier, message: &str) {
    if let Err(err) = notifier.send(NOTIFICATION_TITLE, message) {
        warn!(error = %err, "notification failed; continuing");
    }
}
