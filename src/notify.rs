//! User-visible alerts
//!
//! Fire-and-forget: alerting never fails and never blocks the caller.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertLevel::Info => "info",
            AlertLevel::Success => "success",
            AlertLevel::Warning => "warning",
            AlertLevel::Danger => "danger",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

pub trait Notifier {
    fn alert(&self, level: AlertLevel, message: &str);
}

/// Routes alerts to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, level: AlertLevel, message: &str) {
        match level {
            AlertLevel::Danger => error!(%level, "{}", message),
            AlertLevel::Warning => warn!(%level, "{}", message),
            AlertLevel::Info | AlertLevel::Success => info!(%level, "{}", message),
        }
    }
}

/// Keeps every alert; clones share the same list
#[derive(Debug, Default, Clone)]
pub struct CollectingNotifier {
    alerts: Rc<RefCell<Vec<Alert>>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.borrow().clone()
    }

    pub fn clear(&self) {
        self.alerts.borrow_mut().clear();
    }
}

impl Notifier for CollectingNotifier {
    fn alert(&self, level: AlertLevel, message: &str) {
        self.alerts.borrow_mut().push(Alert {
            level,
            message: message.to_string(),
        });
    }
}
