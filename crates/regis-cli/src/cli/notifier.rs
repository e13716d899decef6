use std::io::{BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use regis_core::error::NotifyError;
use regis_core::{NotificationBackend, Permission};

type Prompt = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Notifications for a terminal session: a bell plus a highlighted line
pub struct TerminalNotifier {
    permission: Mutex<Permission>,
    prompt: Prompt,
}

impl TerminalNotifier {
    pub fn new(permission: Permission) -> Self {
        Self::with_prompt(permission, Arc::new(read_stdin_answer))
    }

    pub fn with_prompt(permission: Permission, prompt: Prompt) -> Self {
        Self {
            permission: Mutex::new(permission),
            prompt,
        }
    }
}

fn read_stdin_answer() -> Option<String> {
    eprint!("Show desktop notifications for announcements? [y/n] ");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

/// y/yes grants, n/no denies, anything else leaves the choice open
pub fn parse_answer(answer: Option<&str>) -> Permission {
    match answer.map(|a| a.trim().to_ascii_lowercase()).as_deref() {
        Some("y") | Some("yes") => Permission::Granted,
        Some("n") | Some("no") => Permission::Denied,
        _ => Permission::Default,
    }
}

pub fn format_notification(title: &str, body: &str) -> String {
    format!("\x07🔔 {}: {}", title, body)
}

#[async_trait]
impl NotificationBackend for TerminalNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> Permission {
        let prompt = self.prompt.clone();
        let answer = match tokio::task::spawn_blocking(move || prompt()).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Permission prompt failed: {}", e);
                None
            }
        };
        let decided = parse_answer(answer.as_deref());
        if decided != Permission::Default {
            *self.permission.lock() = decided;
        }
        tracing::debug!(?decided, "notification permission answered");
        decided
    }

    fn show(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", format_notification(title, body))?;
        stdout.flush()?;
        Ok(())
    }
}
