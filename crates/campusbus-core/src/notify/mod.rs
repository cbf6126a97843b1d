//! User-facing notifications for completed requests.
//!
//! This module provides:
//! - `Notifier`: the surface toasts are delivered to
//! - `TracingNotifier`: writes notifications to the log
//! - `ChannelNotifier`: hands notifications to a UI task over a channel
//! - `emit`: the best-effort boundary every notification goes through
//!
//! Delivery problems never reach the code that made the request.

pub mod message;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub use message::{extract_message, failure_message, success_message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification receiver is gone")]
    Closed,

    #[error("{0}")]
    Other(String),
}

/// Destination for request outcome notifications.
///
/// Implementations must not block; anything slow belongs on the other side
/// of a channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Logs notifications through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        match notification.severity {
            Severity::Success => info!(text = %notification.message, "Request succeeded"),
            Severity::Error => warn!(text = %notification.message, "Request failed"),
        }
        Ok(())
    }
}

/// Forwards notifications to a receiver, typically a UI loop that renders
/// them as toasts.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }

    /// Create a notifier together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.tx
            .send(notification.clone())
            .map_err(|_| NotifyError::Closed)
    }
}

/// Deliver a notification, containing any error or panic from the notifier.
pub fn emit(notifier: &dyn Notifier, severity: Severity, message: String) {
    let notification = Notification { severity, message };
    match panic::catch_unwind(AssertUnwindSafe(|| notifier.notify(&notification))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            warn!(error = %e, severity = %severity, "Dropped notification");
        }
        Err(_) => {
            warn!(severity = %severity, "Notifier panicked, dropped notification");
        }
    }
}
