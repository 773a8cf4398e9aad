//! User-visible speech status: loading indicator and error surfaces
//!
//! A terminal speech failure is always logged, then shown on the first
//! surface that exists: inline, transient notification, developer alert.

use log::error;
use std::sync::Arc;

/// Somewhere a message can be shown to the learner
pub trait Notice: Send + Sync {
    fn show(&self, message: &str);
}

/// Indicator shown while a speak call is in progress
pub trait LoadingIndicator: Send + Sync {
    fn set_loading(&self, loading: bool);
}

/// Which surface displayed an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Inline,
    Notification,
    DeveloperAlert,
    LogOnly,
}

/// Ordered error surfaces plus the loading indicator
#[derive(Default, Clone)]
pub struct ErrorSurface {
    inline: Option<Arc<dyn Notice>>,
    notification: Option<Arc<dyn Notice>>,
    developer_alert: Option<Arc<dyn Notice>>,
    loading: Option<Arc<dyn LoadingIndicator>>,
}

impl ErrorSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inline(mut self, notice: Arc<dyn Notice>) -> Self {
        self.inline = Some(notice);
        self
    }

    pub fn with_notification(mut self, notice: Arc<dyn Notice>) -> Self {
        self.notification = Some(notice);
        self
    }

    /// Only wire this in developer builds or debug mode
    pub fn with_developer_alert(mut self, notice: Arc<dyn Notice>) -> Self {
        self.developer_alert = Some(notice);
        self
    }

    pub fn with_loading(mut self, indicator: Arc<dyn LoadingIndicator>) -> Self {
        self.loading = Some(indicator);
        self
    }

    pub fn set_loading(&self, loading: bool) {
        if let Some(indicator) = &self.loading {
            indicator.set_loading(loading);
        }
    }

    /// Report a terminal speech failure
    pub fn report(&self, message: &str) -> Surface {
        error!("❌ Speech error: {}", message);

        if let Some(inline) = &self.inline {
            inline.show(message);
            Surface::Inline
        } else if let Some(notification) = &self.notification {
            notification.show(message);
            Surface::Notification
        } else if let Some(alert) = &self.developer_alert {
            alert.show(&format!("Speech error: {}", message));
            Surface::DeveloperAlert
        } else {
            Surface::LogOnly
        }
    }
}
