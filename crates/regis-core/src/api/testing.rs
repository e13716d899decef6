//! In-memory `MessagingApi` for component tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use tokio::sync::watch;

use super::{ApiStatus, MessagingApi, SendMessageRequest};
use crate::compose::ControlState;
use crate::error::ApiError;
use crate::models::{AnnouncementId, Message, MessageId, ThreadId};

#[derive(Default)]
pub struct FakeApi {
    send_results: Mutex<VecDeque<Result<ApiStatus, ApiError>>>,
    pub sent: Mutex<Vec<SendMessageRequest>>,
    control: Mutex<Option<watch::Receiver<ControlState>>>,
    /// Control state seen while each send was in flight
    pub observed_control: Mutex<Vec<(bool, String)>>,
    pub read_requests: Mutex<Vec<(AnnouncementId, String)>>,
    /// Server-side read receipts; a set, so repeats do not double-count
    pub read_receipts: Mutex<HashSet<AnnouncementId>>,
    read_failures: Mutex<u32>,
    pub messages: Mutex<Vec<Message>>,
    pub fetches: Mutex<Vec<(ThreadId, Option<MessageId>)>>,
    fetch_failures: Mutex<u32>,
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".to_string(),
    }
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_messages(messages: Vec<Message>) -> Arc<Self> {
        let api = Self::default();
        *api.messages.lock() = messages;
        Arc::new(api)
    }

    pub fn queue_send(&self, result: Result<ApiStatus, ApiError>) {
        self.send_results.lock().push_back(result);
    }

    pub fn fail_next_send(&self) {
        self.queue_send(Err(server_error()));
    }

    pub fn watch_control(&self, control: watch::Receiver<ControlState>) {
        *self.control.lock() = Some(control);
    }

    pub fn fail_next_reads(&self, count: u32) {
        *self.read_failures.lock() = count;
    }

    pub fn fail_next_fetches(&self, count: u32) {
        *self.fetch_failures.lock() = count;
    }

    pub fn push_message(&self, message: Message) {
        self.messages.lock().push(message);
    }

    fn take_failure(counter: &Mutex<u32>) -> bool {
        let mut remaining = counter.lock();
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl MessagingApi for FakeApi {
    async fn send_message(&self, request: &SendMessageRequest) -> Result<ApiStatus, ApiError> {
        let control = self.control.lock().clone();
        if let Some(control) = control {
            let state = control.borrow().clone();
            self.observed_control.lock().push((state.disabled, state.label));
        }
        tokio::task::yield_now().await;

        self.sent.lock().push(request.clone());
        self.send_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiStatus::success()))
    }

    async fn mark_announcement_read(
        &self,
        id: AnnouncementId,
        csrf_token: &str,
    ) -> Result<ApiStatus, ApiError> {
        self.read_requests.lock().push((id, csrf_token.to_string()));
        tokio::task::yield_now().await;

        if Self::take_failure(&self.read_failures) {
            return Err(server_error());
        }
        self.read_receipts.lock().insert(id);
        Ok(ApiStatus::success())
    }

    async fn fetch_thread_messages(
        &self,
        thread_id: ThreadId,
        after: Option<MessageId>,
    ) -> Result<Vec<Message>, ApiError> {
        self.fetches.lock().push((thread_id, after));
        if Self::take_failure(&self.fetch_failures) {
            return Err(server_error());
        }

        let messages = self
            .messages
            .lock()
            .iter()
            .filter(|m| m.thread_id.map_or(true, |t| t == thread_id))
            .filter(|m| match (after, m.id()) {
                (Some(cursor), Some(id)) => id > cursor,
                _ => true,
            })
            .cloned()
            .collect();
        Ok(messages)
    }
}
