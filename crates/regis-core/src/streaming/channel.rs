use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};

use super::receiver::{ConnectionState, FrameOutcome, LiveReceiver, ReconnectPolicy, RecoveryFetch};
use super::PushTransport;
use crate::alerts::Alert;
use crate::api::MessagingApi;
use crate::config::ChannelContext;
use crate::constants::{LOAD_FAILED_ALERT, NEW_ANNOUNCEMENT_TITLE, SHUTDOWN_GRACE};
use crate::events::ChannelEvent;
use crate::models::is_thread_ordered;
use crate::notify::NotificationPresenter;

enum Command {
    Reload,
}

/// Live channel for one mounted thread view.
///
/// `spawn` moves it onto a task that loads the thread, opens the push
/// connection and reports everything as `ChannelEvent`s until the returned
/// handle is stopped or dropped.
pub struct LiveChannel {
    receiver: LiveReceiver,
    api: Arc<dyn MessagingApi>,
    transport: Box<dyn PushTransport>,
    presenter: NotificationPresenter,
}

impl LiveChannel {
    pub fn new(
        context: ChannelContext,
        policy: ReconnectPolicy,
        api: Arc<dyn MessagingApi>,
        transport: impl PushTransport + 'static,
        presenter: NotificationPresenter,
    ) -> Self {
        Self {
            receiver: LiveReceiver::new(context, policy),
            api,
            transport: Box::new(transport),
            presenter,
        }
    }

    pub fn spawn(self) -> (LiveChannelHandle, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let driver = Driver {
            receiver: self.receiver,
            api: self.api,
            transport: self.transport,
            presenter: self.presenter,
            notifications: JoinSet::new(),
            events: event_tx,
        };
        let task = tokio::spawn(driver.run(command_rx, shutdown_rx));

        let handle = LiveChannelHandle {
            commands: command_tx,
            shutdown: shutdown_tx,
            task: Some(task),
        };
        (handle, event_rx)
    }
}

/// Owner side of a spawned live channel. Dropping it aborts the task.
pub struct LiveChannelHandle {
    commands: mpsc::UnboundedSender<Command>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl LiveChannelHandle {
    /// Re-fetch the whole thread and replace the displayed list
    pub fn reload(&self) -> bool {
        self.commands.send(Command::Reload).is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Close the connection, cancel pending timers and wait for the task.
    /// A handshake or fetch in flight is abandoned; a close that does not
    /// finish within `SHUTDOWN_GRACE` is cut short by aborting the task.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        let Some(mut task) = self.task.take() else {
            return;
        };
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!("Live channel task ended abnormally: {}", e),
            Err(_) => {
                tracing::warn!("Live channel did not stop in time, aborting");
                task.abort();
            }
        }
    }
}

impl Drop for LiveChannelHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Run `work` unless shutdown is signalled first. Returns whether it finished.
async fn until_shutdown(
    shutdown: &mut watch::Receiver<bool>,
    work: impl Future<Output = ()>,
) -> bool {
    tokio::select! {
        biased;
        _ = shutdown.changed() => false,
        _ = work => true,
    }
}

struct Driver {
    receiver: LiveReceiver,
    api: Arc<dyn MessagingApi>,
    transport: Box<dyn PushTransport>,
    presenter: NotificationPresenter,
    notifications: JoinSet<()>,
    events: mpsc::UnboundedSender<ChannelEvent>,
}

impl Driver {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let started = until_shutdown(&mut shutdown, async {
            self.load(RecoveryFetch {
                after: None,
                replace: true,
            })
            .await;
            self.connect().await;
        })
        .await;

        if started {
            self.serve(&mut commands, &mut shutdown).await;
        }

        self.notifications.abort_all();
        while self.notifications.join_next().await.is_some() {}
        self.transport.close().await;
        tracing::debug!(thread_id = self.receiver.context().thread_id, "live channel stopped");
    }

    async fn serve(
        &mut self,
        commands: &mut mpsc::UnboundedReceiver<Command>,
        shutdown: &mut watch::Receiver<bool>,
    ) {
        loop {
            let connected = self.receiver.state() == ConnectionState::Connected;
            let deadline = self.receiver.reconnect_deadline();
            let wake_at = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                _ = shutdown.changed() => return,
                command = commands.recv() => match command {
                    Some(Command::Reload) => {
                        let reload = RecoveryFetch { after: None, replace: true };
                        if !until_shutdown(shutdown, self.load(reload)).await {
                            return;
                        }
                    }
                    None => return,
                },
                frame = self.transport.next_frame(), if connected => match frame {
                    Some(text) => self.handle_frame(&text),
                    None => self.handle_close(),
                },
                _ = sleep_until(wake_at), if deadline.is_some() => {
                    if !until_shutdown(shutdown, self.recover()).await {
                        return;
                    }
                }
                Some(result) = self.notifications.join_next(), if !self.notifications.is_empty() => {
                    if let Err(e) = result {
                        tracing::debug!("Notification task failed: {}", e);
                    }
                }
            }
        }
    }

    fn emit(&self, event: ChannelEvent) {
        let _ = self.events.send(event);
    }

    fn handle_frame(&mut self, text: &str) {
        match self.receiver.on_frame(text) {
            FrameOutcome::Appended(message) => self.emit(ChannelEvent::MessageAppended(message)),
            FrameOutcome::Duplicate(id) => tracing::debug!(id, "dropping duplicate push"),
            FrameOutcome::OtherThread(thread_id) => {
                tracing::debug!(?thread_id, "push for another thread")
            }
            FrameOutcome::Announcement { title, .. } => {
                let presenter = self.presenter.clone();
                let body = title.clone();
                self.notifications.spawn(async move {
                    presenter.notify(NEW_ANNOUNCEMENT_TITLE, &body).await;
                });
                self.emit(ChannelEvent::Announcement { title });
            }
            FrameOutcome::Ignored => {}
        }
    }

    fn handle_close(&mut self) {
        if let Some(delay) = self.receiver.on_close(Instant::now()) {
            tracing::info!(
                delay_ms = delay.as_millis() as u64,
                attempts = self.receiver.attempts(),
                "push channel down, reconnect scheduled"
            );
            self.emit(ChannelEvent::StateChanged(ConnectionState::Disconnected));
            self.emit(ChannelEvent::ReconnectScheduled(delay));
        }
    }

    async fn recover(&mut self) {
        if !self.receiver.take_due_reconnect(Instant::now()) {
            return;
        }
        self.emit(ChannelEvent::StateChanged(ConnectionState::Reconnecting));

        if self.receiver.policy().resumes() {
            // Take the cursor only once frames flow again
            if self.connect().await {
                self.load(self.receiver.recovery_fetch()).await;
            }
        } else {
            self.load(self.receiver.recovery_fetch()).await;
            self.connect().await;
        }
    }

    async fn connect(&mut self) -> bool {
        let url = self.receiver.context().socket_url.clone();
        match self.transport.connect(&url).await {
            Ok(()) => {
                self.receiver.on_open();
                self.emit(ChannelEvent::StateChanged(ConnectionState::Connected));
                true
            }
            Err(e) => {
                tracing::warn!("Failed to connect push channel: {}", e);
                self.handle_close();
                false
            }
        }
    }

    async fn load(&mut self, fetch: RecoveryFetch) {
        let thread_id = self.receiver.context().thread_id;
        let messages = match self.api.fetch_thread_messages(thread_id, fetch.after).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!("Failed to load thread {}: {}", thread_id, e);
                self.emit(ChannelEvent::Alert(Alert::warning(LOAD_FAILED_ALERT)));
                return;
            }
        };

        if fetch.replace {
            if !is_thread_ordered(&messages) {
                tracing::warn!(thread_id, "server returned messages out of order");
            }
            let rendered = self.receiver.apply_reload(&messages);
            self.emit(ChannelEvent::MessagesReloaded(rendered));
        } else {
            let rendered = self.receiver.apply_merge(&messages);
            if !rendered.is_empty() {
                self.emit(ChannelEvent::MessagesMerged(rendered));
            }
        }
    }
}
