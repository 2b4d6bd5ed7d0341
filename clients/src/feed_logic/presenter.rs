use chrono::{DateTime, Utc};
use colored::Colorize;
use lib_docs::core::NotificationQueueState;
use lib_docs::documents::NotificationItem;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// "just now", "5m ago", "2h ago", "3d ago"; unparseable stamps are shown as-is.
pub fn relative_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(at) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let secs = (now - at.with_timezone(&Utc)).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

pub fn render_toast(item: &NotificationItem, badge: u64, now: DateTime<Utc>) -> String {
    format!(
        "{} {} updated {} {}",
        format!("[{}]", badge).yellow().bold(),
        item.user_name.cyan(),
        item.document_title.bold(),
        format!("({})", relative_time(&item.timestamp, now)).dimmed()
    )
}

/// Number of notifications taken off the queue since the last clear.
///
/// Every show pops exactly one item, so this changes on each show even when
/// two queued notifications carry identical content.
fn shown_sequence(state: &NotificationQueueState) -> u64 {
    state.total_count.saturating_sub(state.queue.len() as u64)
}

/// Returns the notification to announce if `state` shows one that
/// `last_sequence` has not been announced yet, and records it.
fn newly_shown<'a>(
    state: &'a NotificationQueueState,
    last_sequence: &mut u64,
) -> Option<&'a NotificationItem> {
    let sequence = shown_sequence(state);
    if sequence < *last_sequence {
        // cleared
        *last_sequence = sequence;
    }
    match (&state.current_notification, state.is_showing) {
        (Some(current), true) if sequence != *last_sequence => {
            *last_sequence = sequence;
            Some(current)
        }
        _ => None,
    }
}

/// Prints a toast each time a new notification becomes visible.
pub async fn run(mut rx: watch::Receiver<NotificationQueueState>, token: CancellationToken) {
    let mut last_sequence = 0u64;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if let Some(current) = newly_shown(&state, &mut last_sequence) {
                    println!("{}", render_toast(current, state.total_count, Utc::now()));
                }
            }
        }
    }
}
