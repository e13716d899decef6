use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use regis_core::alerts::AlertQueue;
use regis_core::api::HttpMessagingApi;
use regis_core::constants::MARK_READ_FAILED_ALERT;
use regis_core::models::{Announcement, AnnouncementId, Message, ThreadId, UserId};
use regis_core::view::MessageList;
use regis_core::{
    AnnouncementCard, Capabilities, ChannelEvent, ComposeForm, ConnectionState, CoreConfig,
    LiveChannel, MessagingApi, NotificationPresenter, OutboundSubmitter, ReadOutcome,
    ReadReconciler, SubmitOutcome, ViewEvent, WebSocketTransport,
};
use tokio::sync::mpsc;

use super::notifier::TerminalNotifier;

/// Commands understood by the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Send {
        thread_id: ThreadId,
        recipient: String,
        subject: String,
        body: String,
        attachments: Vec<PathBuf>,
    },
    MarkRead {
        announcement_id: AnnouncementId,
    },
    Listen {
        thread_id: ThreadId,
    },
    Thread {
        thread_id: ThreadId,
    },
}

pub async fn run(command: CliCommand, config: &CoreConfig) -> Result<()> {
    match command {
        CliCommand::Send {
            thread_id,
            recipient,
            subject,
            body,
            attachments,
        } => send(config, thread_id, recipient, subject, body, &attachments).await,
        CliCommand::MarkRead { announcement_id } => mark_read(config, announcement_id).await,
        CliCommand::Listen { thread_id } => listen(config, thread_id).await,
        CliCommand::Thread { thread_id } => print_thread(config, thread_id).await,
    }
}

fn http_api(config: &CoreConfig) -> Result<Arc<HttpMessagingApi>> {
    let api = HttpMessagingApi::new(config)
        .with_context(|| format!("Invalid base URL: {}", config.base_url))?;
    Ok(Arc::new(api))
}

/// Print queued alerts, most important first
fn flush_alerts(view_rx: &mut mpsc::UnboundedReceiver<ViewEvent>) -> bool {
    let mut alerts = AlertQueue::new();
    let mut reload = false;
    while let Ok(event) = view_rx.try_recv() {
        match event {
            ViewEvent::Alert(alert) => alerts.push(alert),
            ViewEvent::ReloadMessages => reload = true,
        }
    }
    while let Some(alert) = alerts.current() {
        eprintln!("{} {}", alert.level.icon(), alert.message);
        alerts.dismiss();
    }
    reload
}

async fn send(
    config: &CoreConfig,
    thread_id: ThreadId,
    recipient: String,
    subject: String,
    body: String,
    attachments: &[PathBuf],
) -> Result<()> {
    let api = http_api(config)?;

    let mut form = ComposeForm::new(thread_id);
    form.draft.recipient = recipient;
    form.draft.subject = subject;
    form.draft.body = body;
    for path in attachments {
        form.attach_path(path)
            .await
            .with_context(|| format!("Failed to read attachment: {}", path.display()))?;
    }
    for preview in &form.draft.previews {
        println!("📎 {}", preview);
    }

    let (view_tx, mut view_rx) = mpsc::unbounded_channel();
    let submitter = OutboundSubmitter::new(api.clone(), view_tx);
    let outcome = submitter.submit(&mut form).await;
    let reload = flush_alerts(&mut view_rx);

    match outcome {
        SubmitOutcome::Sent => {
            println!("Message sent");
            if reload {
                show_thread(api.as_ref(), config.current_user_id, thread_id).await?;
            }
            Ok(())
        }
        SubmitOutcome::Rejected(status) => bail!(
            "Server rejected the message: {}",
            status.message.unwrap_or(status.status)
        ),
        SubmitOutcome::Failed(e) => Err(anyhow::Error::new(e).context("Failed to send message")),
        SubmitOutcome::Busy => bail!("A send is already in progress"),
    }
}

async fn mark_read(config: &CoreConfig, announcement_id: AnnouncementId) -> Result<()> {
    let api = http_api(config)?;

    let csrf_token = match &config.csrf_token {
        Some(token) => token.clone(),
        None => api
            .fetch_csrf_token()
            .await
            .context("Failed to load the announcements page")?
            .context("No anti-forgery token on the announcements page")?,
    };

    let (view_tx, mut view_rx) = mpsc::unbounded_channel();
    let reconciler = ReadReconciler::new(api, csrf_token, view_tx);
    let mut card = AnnouncementCard::new(Announcement::new(announcement_id, "", ""));

    let outcome = reconciler.mark_read(&mut card).await;
    flush_alerts(&mut view_rx);
    match outcome {
        ReadOutcome::Marked(_) => {
            println!("Announcement {} marked as read", announcement_id);
            Ok(())
        }
        ReadOutcome::Failed => bail!(MARK_READ_FAILED_ALERT),
    }
}

async fn print_thread(config: &CoreConfig, thread_id: ThreadId) -> Result<()> {
    let api = http_api(config)?;
    show_thread(api.as_ref(), config.current_user_id, thread_id).await
}

async fn show_thread(
    api: &dyn MessagingApi,
    current_user_id: Option<UserId>,
    thread_id: ThreadId,
) -> Result<()> {
    let messages = api
        .fetch_thread_messages(thread_id, None)
        .await
        .with_context(|| format!("Failed to load thread {}", thread_id))?;
    for line in render_thread(&messages, current_user_id) {
        println!("{}", line);
    }
    Ok(())
}

/// One display line per message; without a known user every message counts
/// as received
pub fn render_thread(messages: &[Message], current_user_id: Option<UserId>) -> Vec<String> {
    let mut list = MessageList::new(current_user_id.unwrap_or_default());
    list.replace_all(messages)
        .iter()
        .map(|m| m.to_string())
        .collect()
}

async fn listen(config: &CoreConfig, thread_id: ThreadId) -> Result<()> {
    let capabilities = Capabilities::resolve(config, std::io::stdout().is_terminal());
    if !capabilities.push_channel {
        bail!("Live updates need a ws:// or wss:// socketUrl in the config");
    }
    let context = config
        .channel_context(thread_id)
        .context("Live updates need currentUserId in the config")?;

    let presenter = if capabilities.notifications {
        NotificationPresenter::new(Arc::new(TerminalNotifier::new(
            config.notification_permission,
        )))
    } else {
        NotificationPresenter::unsupported()
    };

    let channel = LiveChannel::new(
        context,
        config.reconnect.policy(),
        http_api(config)?,
        WebSocketTransport::new(),
        presenter,
    );
    let (handle, mut events) = channel.spawn();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if let Some(line) = describe_event(&event, capabilities.notifications) {
                        println!("{}", line);
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                eprintln!("Stopping...");
                break;
            }
        }
    }

    handle.stop().await;
    Ok(())
}

/// Terminal line for a channel event. Announcements are only printed here
/// when no notification presenter shows them.
pub fn describe_event(event: &ChannelEvent, notifications: bool) -> Option<String> {
    match event {
        ChannelEvent::StateChanged(state) => Some(
            match state {
                ConnectionState::Connected => "-- connected",
                ConnectionState::Disconnected => "-- disconnected",
                ConnectionState::Reconnecting => "-- reconnecting",
            }
            .to_string(),
        ),
        ChannelEvent::MessageAppended(message) => Some(message.to_string()),
        ChannelEvent::MessagesReloaded(list) | ChannelEvent::MessagesMerged(list) => {
            if list.is_empty() {
                None
            } else {
                Some(
                    list.iter()
                        .map(|m| m.to_string())
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
            }
        }
        ChannelEvent::ReconnectScheduled(delay) => {
            Some(format!("-- retrying in {:.1}s", delay.as_secs_f64()))
        }
        ChannelEvent::Announcement { title } => {
            (!notifications).then(|| format!("📢 Announcement: {}", title))
        }
        ChannelEvent::Alert(alert) => Some(format!("{} {}", alert.level.icon(), alert.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regis_core::alerts::Alert;
    use regis_core::constants::LOAD_FAILED_ALERT;
    use regis_core::models::Sender;
    use std::time::Duration;

    fn message(id: u64, sender_id: u64, body: &str) -> Message {
        let sender = Sender {
            id: sender_id,
            name: format!("user{}", sender_id),
        };
        Message::new(Some(id), sender, body, "2026-10-19T09:00:00Z")
    }

    #[test]
    fn test_render_thread_marks_own_messages() {
        let lines = render_thread(&[message(1, 9, "hi"), message(2, 7, "hello")], Some(9));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("(you)"));
        assert!(!lines[1].contains("(you)"));
    }

    #[test]
    fn test_render_thread_without_user() {
        let lines = render_thread(&[message(1, 9, "hi")], None);
        assert!(!lines[0].contains("(you)"));
    }

    #[test]
    fn test_describe_events() {
        assert_eq!(
            describe_event(&ChannelEvent::StateChanged(ConnectionState::Connected), true).as_deref(),
            Some("-- connected")
        );
        assert_eq!(
            describe_event(&ChannelEvent::ReconnectScheduled(Duration::from_millis(5000)), true)
                .as_deref(),
            Some("-- retrying in 5.0s")
        );
        assert_eq!(describe_event(&ChannelEvent::MessagesMerged(vec![]), true), None);
    }

    #[test]
    fn test_describe_load_failure() {
        let event = ChannelEvent::Alert(Alert::warning(LOAD_FAILED_ALERT));
        assert_eq!(
            describe_event(&event, true).as_deref(),
            Some("⚠ Failed to load messages. Please try again.")
        );
    }

    #[test]
    fn test_announcement_printed_only_without_notifications() {
        let event = ChannelEvent::Announcement {
            title: "Sports day".to_string(),
        };
        assert_eq!(describe_event(&event, true), None);
        assert_eq!(
            describe_event(&event, false).as_deref(),
            Some("📢 Announcement: Sports day")
        );
    }
}
