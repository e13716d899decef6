//! Compose form and the outbound message submitter.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::alerts::Alert;
use crate::api::{ApiStatus, FileUpload, MessagingApi, SendMessageRequest};
use crate::constants::{DEFAULT_SUBMIT_LABEL, SENDING_LABEL, SEND_FAILED_ALERT};
use crate::error::ApiError;
use crate::events::ViewEvent;
use crate::format::format_size;
use crate::models::ThreadId;

/// Rendered state of the submit button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub disabled: bool,
    pub label: String,
}

/// Submit button; renderers observe it through `subscribe`
#[derive(Debug)]
pub struct SubmitControl {
    state: watch::Sender<ControlState>,
}

impl SubmitControl {
    pub fn new(label: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ControlState {
            disabled: false,
            label: label.into(),
        });
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ControlState> {
        self.state.subscribe()
    }

    pub fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    pub fn label(&self) -> String {
        self.state.borrow().label.clone()
    }

    /// Disable and show the busy label until the guard drops
    fn begin_busy(&self) -> BusyGuard<'_> {
        let previous = self.state.send_replace(ControlState {
            disabled: true,
            label: SENDING_LABEL.to_string(),
        });
        BusyGuard {
            control: self,
            label: previous.label,
        }
    }
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMIT_LABEL)
    }
}

/// Restores the control on every exit path of a submission
struct BusyGuard<'a> {
    control: &'a SubmitControl,
    label: String,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.control.state.send_replace(ControlState {
            disabled: false,
            label: std::mem::take(&mut self.label),
        });
    }
}

/// Preview line shown under the file input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPreview {
    pub filename: String,
    pub size_label: String,
}

impl fmt::Display for AttachmentPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.filename, self.size_label)
    }
}

/// Field values of the compose form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeDraft {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub files: Vec<FileUpload>,
    pub previews: Vec<AttachmentPreview>,
}

impl ComposeDraft {
    pub fn is_empty(&self) -> bool {
        self.recipient.is_empty()
            && self.subject.is_empty()
            && self.body.is_empty()
            && self.files.is_empty()
            && self.previews.is_empty()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Compose form bound to one thread
#[derive(Debug)]
pub struct ComposeForm {
    pub thread_id: ThreadId,
    pub draft: ComposeDraft,
    control: SubmitControl,
}

impl ComposeForm {
    pub fn new(thread_id: ThreadId) -> Self {
        Self {
            thread_id,
            draft: ComposeDraft::default(),
            control: SubmitControl::default(),
        }
    }

    pub fn control(&self) -> &SubmitControl {
        &self.control
    }

    pub fn attach_file(&mut self, file: FileUpload) {
        self.draft.previews.push(AttachmentPreview {
            filename: file.filename.clone(),
            size_label: format_size(file.size()),
        });
        self.draft.files.push(file);
    }

    pub async fn attach_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ApiError> {
        let file = FileUpload::from_path(path).await?;
        self.attach_file(file);
        Ok(())
    }

    pub fn to_request(&self) -> SendMessageRequest {
        SendMessageRequest {
            thread_id: self.thread_id,
            recipient: self.draft.recipient.clone(),
            subject: self.draft.subject.clone(),
            body: self.draft.body.clone(),
            files: self.draft.files.clone(),
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Accepted; the form was cleared and a reload requested
    Sent,
    /// The server answered with a non-success status
    Rejected(ApiStatus),
    /// The request itself failed
    Failed(ApiError),
    /// A submission for this form is already in flight
    Busy,
}

impl SubmitOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SubmitOutcome::Sent)
    }
}

/// Posts compose forms, one request per call, never retrying
pub struct OutboundSubmitter {
    api: Arc<dyn MessagingApi>,
    events: mpsc::UnboundedSender<ViewEvent>,
}

impl OutboundSubmitter {
    pub fn new(api: Arc<dyn MessagingApi>, events: mpsc::UnboundedSender<ViewEvent>) -> Self {
        Self { api, events }
    }

    pub async fn submit(&self, form: &mut ComposeForm) -> SubmitOutcome {
        if form.control.is_disabled() {
            return SubmitOutcome::Busy;
        }

        let _busy = form.control.begin_busy();
        let request = form.to_request();

        let outcome = match self.api.send_message(&request).await {
            Ok(status) if status.is_success() => {
                form.draft.clear();
                let _ = self.events.send(ViewEvent::ReloadMessages);
                SubmitOutcome::Sent
            }
            Ok(status) => {
                tracing::warn!(status = %status.status, "send rejected by server");
                SubmitOutcome::Rejected(status)
            }
            Err(e) => {
                tracing::warn!("Failed to send message: {}", e);
                SubmitOutcome::Failed(e)
            }
        };

        if !outcome.is_sent() {
            let _ = self.events.send(ViewEvent::Alert(Alert::error(SEND_FAILED_ALERT)));
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;

    fn filled_form() -> ComposeForm {
        let mut form = ComposeForm::new(42);
        form.draft.recipient = "9".to_string();
        form.draft.subject = "Homework".to_string();
        form.draft.body = "Hello".to_string();
        form.attach_file(FileUpload::new("plan.pdf", vec![0; 1536]));
        form
    }

    fn submitter(api: Arc<FakeApi>) -> (OutboundSubmitter, mpsc::UnboundedReceiver<ViewEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (OutboundSubmitter::new(api, tx), rx)
    }

    #[test]
    fn test_attach_file_adds_preview() {
        let form = filled_form();
        assert_eq!(form.draft.files.len(), 1);
        assert_eq!(form.draft.previews[0].to_string(), "plan.pdf (1.50 KB)");
    }

    #[tokio::test]
    async fn test_success_clears_form_and_requests_reload() {
        let api = FakeApi::new();
        let (submitter, mut events) = submitter(api.clone());
        let mut form = filled_form();

        let outcome = submitter.submit(&mut form).await;
        assert!(outcome.is_sent());
        assert!(form.draft.is_empty());
        assert_eq!(events.try_recv().unwrap(), ViewEvent::ReloadMessages);
        assert!(events.try_recv().is_err());

        let sent = api.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].thread_id, 42);
        assert_eq!(sent[0].body, "Hello");
        assert_eq!(sent[0].files[0].filename, "plan.pdf");
    }

    #[tokio::test]
    async fn test_failure_keeps_form_and_alerts() {
        let api = FakeApi::new();
        api.fail_next_send();
        let (submitter, mut events) = submitter(api.clone());
        let mut form = filled_form();
        let before = form.draft.clone();

        let outcome = submitter.submit(&mut form).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(form.draft, before);
        match events.try_recv().unwrap() {
            ViewEvent::Alert(alert) => assert_eq!(alert.message, SEND_FAILED_ALERT),
            other => panic!("expected alert, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_form_and_alerts() {
        let api = FakeApi::new();
        api.queue_send(Ok(ApiStatus::error("invalid recipient")));
        let (submitter, mut events) = submitter(api.clone());
        let mut form = filled_form();

        let outcome = submitter.submit(&mut form).await;
        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
        assert_eq!(form.draft.body, "Hello");
        assert!(matches!(events.try_recv().unwrap(), ViewEvent::Alert(_)));
    }

    #[tokio::test]
    async fn test_control_disabled_during_request_on_both_paths() {
        for fail in [false, true] {
            let api = FakeApi::new();
            if fail {
                api.fail_next_send();
            }
            let (submitter, _events) = submitter(api.clone());
            let mut form = filled_form();
            api.watch_control(form.control().subscribe());

            assert!(!form.control().is_disabled());
            submitter.submit(&mut form).await;

            assert_eq!(*api.observed_control.lock(), vec![(true, SENDING_LABEL.to_string())]);
            assert!(!form.control().is_disabled());
            assert_eq!(form.control().label(), DEFAULT_SUBMIT_LABEL);
        }
    }

    #[tokio::test]
    async fn test_custom_label_is_restored() {
        let api = FakeApi::new();
        let (submitter, _events) = submitter(api.clone());
        let mut form = filled_form();
        form.control = SubmitControl::new("Reply");

        submitter.submit(&mut form).await;
        assert_eq!(form.control().label(), "Reply");
    }

    #[tokio::test]
    async fn test_busy_form_sends_nothing() {
        let api = FakeApi::new();
        let (submitter, mut events) = submitter(api.clone());
        let mut form = filled_form();

        // An in-flight submission holds the control
        form.control.state.send_replace(ControlState {
            disabled: true,
            label: SENDING_LABEL.to_string(),
        });

        assert!(matches!(submitter.submit(&mut form).await, SubmitOutcome::Busy));
        assert!(form.control().is_disabled());
        assert!(api.sent.lock().is_empty());
        assert!(events.try_recv().is_err());
        assert_eq!(form.draft.body, "Hello");
    }
}
