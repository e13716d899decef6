use std::cmp::Ordering;

use super::Message;

/// Canonical order within a thread: creation time ascending, ties by id
/// ascending. Timestamps that do not parse compare as raw strings.
pub fn compare_messages(a: &Message, b: &Message) -> Ordering {
    let by_time = match (a.created_at(), b.created_at()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.sent_at.cmp(&b.sent_at),
    };
    by_time.then_with(|| a.id().cmp(&b.id()))
}

/// Whether `messages` is already in canonical thread order
pub fn is_thread_ordered(messages: &[Message]) -> bool {
    messages
        .windows(2)
        .all(|pair| compare_messages(&pair[0], &pair[1]) != Ordering::Greater)
}
