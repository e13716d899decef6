//! Best-effort OS-level notifications.
//!
//! The presenter is built once at startup: with a backend when the host can
//! show notifications at all, without one otherwise. Nothing here ever
//! reports an error to the user.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Notification permission as tracked by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet; the user will be asked on first use
    #[default]
    #[serde(alias = "ask")]
    Default,
}

#[async_trait]
pub trait NotificationBackend: Send + Sync {
    fn permission(&self) -> Permission;

    /// Ask the user. Dismissing the prompt reports `Default`.
    async fn request_permission(&self) -> Permission;

    fn show(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The host has no notification capability
    Unsupported,
    Shown,
    /// Permission denied now or earlier, or the prompt was dismissed
    Suppressed,
    /// The backend failed while showing
    Failed,
}

#[derive(Clone, Default)]
pub struct NotificationPresenter {
    backend: Option<Arc<dyn NotificationBackend>>,
}

impl NotificationPresenter {
    pub fn new(backend: Arc<dyn NotificationBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Presenter for hosts without notification support
    pub fn unsupported() -> Self {
        Self { backend: None }
    }

    pub fn is_supported(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn notify(&self, title: &str, body: &str) -> NotifyOutcome {
        let Some(backend) = &self.backend else {
            return NotifyOutcome::Unsupported;
        };

        let permission = match backend.permission() {
            Permission::Default => backend.request_permission().await,
            decided => decided,
        };

        if permission != Permission::Granted {
            tracing::debug!(?permission, "notification suppressed");
            return NotifyOutcome::Suppressed;
        }

        match backend.show(title, body) {
            Ok(()) => NotifyOutcome::Shown,
            Err(e) => {
                tracing::warn!("Failed to show notification: {}", e);
                NotifyOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for NotificationPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationPresenter")
            .field("supported", &self.is_supported())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeBackend;
    use super::*;

    #[tokio::test]
    async fn test_unsupported_is_silent_noop() {
        let presenter = NotificationPresenter::unsupported();
        assert!(!presenter.is_supported());
        assert_eq!(presenter.notify("t", "b").await, NotifyOutcome::Unsupported);
    }

    #[tokio::test]
    async fn test_granted_shows_immediately() {
        let backend = FakeBackend::new(Permission::Granted, Permission::Denied);
        let presenter = NotificationPresenter::new(backend.clone());

        assert_eq!(presenter.notify("New Announcement", "Sports day").await, NotifyOutcome::Shown);
        assert_eq!(*backend.prompts.lock(), 0);
        assert_eq!(
            *backend.shown.lock(),
            vec![("New Announcement".to_string(), "Sports day".to_string())]
        );
    }

    #[tokio::test]
    async fn test_undecided_prompts_then_shows_on_grant() {
        let backend = FakeBackend::new(Permission::Default, Permission::Granted);
        let presenter = NotificationPresenter::new(backend.clone());

        assert_eq!(presenter.notify("t", "b").await, NotifyOutcome::Shown);
        assert_eq!(*backend.prompts.lock(), 1);

        // Granted is remembered, no second prompt
        assert_eq!(presenter.notify("t", "b2").await, NotifyOutcome::Shown);
        assert_eq!(*backend.prompts.lock(), 1);
        assert_eq!(backend.shown.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_prompt_denied_or_dismissed_shows_nothing() {
        for answer in [Permission::Denied, Permission::Default] {
            let backend = FakeBackend::new(Permission::Default, answer);
            let presenter = NotificationPresenter::new(backend.clone());
            assert_eq!(presenter.notify("t", "b").await, NotifyOutcome::Suppressed);
            assert!(backend.shown.lock().is_empty());
        }
    }

    #[tokio::test]
    async fn test_denied_never_reprompts() {
        let backend = FakeBackend::new(Permission::Denied, Permission::Granted);
        let presenter = NotificationPresenter::new(backend.clone());

        assert_eq!(presenter.notify("t", "b").await, NotifyOutcome::Suppressed);
        assert_eq!(presenter.notify("t", "b").await, NotifyOutcome::Suppressed);
        assert_eq!(*backend.prompts.lock(), 0);
        assert!(backend.shown.lock().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_is_swallowed() {
        let backend = Arc::new(FakeBackend {
            permission: parking_lot::Mutex::new(Permission::Granted),
            prompt_answer: Permission::Granted,
            prompts: parking_lot::Mutex::new(0),
            shown: parking_lot::Mutex::new(Vec::new()),
            fail_show: true,
        });
        let presenter = NotificationPresenter::new(backend);
        assert_eq!(presenter.notify("t", "b").await, NotifyOutcome::Failed);
    }
}
