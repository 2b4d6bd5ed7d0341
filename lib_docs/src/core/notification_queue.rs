//! # Notification Queue State Machine
//!
//! An ordered buffer of incoming notifications with an exactly-one-visible
//! display discipline. The state only changes through [`reduce`], a total
//! function over the four [`QueueAction`]s; it never fails and has no
//! fallback arm, so adding an action forces every match to handle it.
//!
//! ## Phases:
//!
//! | phase           | queue     | current | showing |
//! |-----------------|-----------|---------|---------|
//! | `Idle`          | empty     | none    | false   |
//! | `Queued`        | non-empty | none    | false   |
//! | `Showing`       | any       | some    | true    |
//! | `ShowingHidden` | any       | some    | false   |
//!
//! `total_count` is a badge counter: it grows on every add and only a clear
//! resets it.

use std::collections::VecDeque;

use crate::documents::model::NotificationItem;

/// The four transitions of the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueAction {
    /// Append to the tail; bump `total_count`.
    AddNotification(NotificationItem),
    /// Pop the head into `current_notification` and show it, or go idle when
    /// the queue is empty.
    ShowNext,
    /// Hide the current notification without dismissing it.
    HideCurrent,
    /// Reset everything, including `total_count`.
    ClearQueue,
}

/// Named phase derived from the state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePhase {
    /// Nothing queued, nothing current.
    Idle,
    /// Items waiting, nothing current.
    Queued,
    /// A notification is visible.
    Showing,
    /// A notification is current but hidden, awaiting replacement.
    ShowingHidden,
}

/// Snapshot of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationQueueState {
    /// Pending notifications, oldest first.
    pub queue: VecDeque<NotificationItem>,
    /// The notification taken off the queue by the last `ShowNext`.
    pub current_notification: Option<NotificationItem>,
    /// Whether `current_notification` is visible.
    pub is_showing: bool,
    /// Notifications added since the last clear.
    pub total_count: u64,
}

impl NotificationQueueState {
    /// The empty initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The phase this state is in.
    pub fn phase(&self) -> QueuePhase {
        match (&self.current_notification, self.is_showing) {
            (Some(_), true) => QueuePhase::Showing,
            (Some(_), false) => QueuePhase::ShowingHidden,
            (None, _) if self.queue.is_empty() => QueuePhase::Idle,
            (None, _) => QueuePhase::Queued,
        }
    }

    /// Idle-detection rule: items are waiting, nothing is showing and no
    /// notification is pending, so a `ShowNext` should be issued.
    pub fn needs_auto_advance(&self) -> bool {
        !self.queue.is_empty() && !self.is_showing && self.current_notification.is_none()
    }

    /// Applies `action` in place.
    pub fn apply(&mut self, action: QueueAction) {
        match action {
            QueueAction::AddNotification(item) => {
                self.queue.push_back(item);
                self.total_count += 1;
            }
            QueueAction::ShowNext => match self.queue.pop_front() {
                Some(next) => {
                    self.current_notification = Some(next);
                    self.is_showing = true;
                }
                None => {
                    self.current_notification = None;
                    self.is_showing = false;
                }
            },
            QueueAction::HideCurrent => {
                self.is_showing = false;
            }
            QueueAction::ClearQueue => {
                *self = Self::default();
            }
        }
    }
}

/// Returns the state that results from applying `action` to `state`.
pub fn reduce(mut state: NotificationQueueState, action: QueueAction) -> NotificationQueueState {
    state.apply(action);
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: u32, title: &str, hour: u32) -> NotificationItem {
        NotificationItem {
            timestamp: format!("2024-01-01T{:02}:00:00Z", hour),
            user_id: format!("user{}", n),
            user_name: format!("User {}", n),
            document_id: format!("doc{}", n),
            document_title: title.to_string(),
        }
    }

    fn add(state: NotificationQueueState, it: &NotificationItem) -> NotificationQueueState {
        reduce(state, QueueAction::AddNotification(it.clone()))
    }

    #[test]
    fn test_clear_on_initial_state_is_initial_state() {
        let state = reduce(NotificationQueueState::new(), QueueAction::ClearQueue);
        assert_eq!(state, NotificationQueueState::new());
        assert_eq!(state.phase(), QueuePhase::Idle);
    }

    #[test]
    fn test_add_appends_and_counts() {
        let a = item(1, "Doc A", 10);
        let b = item(2, "Doc B", 11);
        let state = add(add(NotificationQueueState::new(), &a), &b);

        assert_eq!(state.queue, VecDeque::from(vec![a, b]));
        assert_eq!(state.total_count, 2);
        assert!(state.current_notification.is_none());
        assert!(!state.is_showing);
        assert_eq!(state.phase(), QueuePhase::Queued);
        assert!(state.needs_auto_advance());
    }

    #[test]
    fn test_add_preserves_current() {
        let a = item(1, "Doc A", 10);
        let b = item(2, "Doc B", 11);
        let showing = NotificationQueueState {
            current_notification: Some(a.clone()),
            is_showing: true,
            total_count: 1,
            ..Default::default()
        };
        let state = add(showing, &b);
        assert_eq!(state.current_notification, Some(a));
        assert!(state.is_showing);
        assert_eq!(state.queue.len(), 1);
        assert_eq!(state.total_count, 2);
        assert!(!state.needs_auto_advance());
    }

    #[test]
    fn test_fifo_scenario() {
        let items = [item(1, "Doc A", 10), item(2, "Doc B", 11), item(3, "Doc C", 12)];
        let mut state = NotificationQueueState::new();
        for it in &items {
            state = add(state, it);
        }

        for (expected, remaining) in items.iter().zip([2usize, 1, 0]) {
            state = reduce(state, QueueAction::ShowNext);
            assert_eq!(state.current_notification.as_ref(), Some(expected));
            assert_eq!(state.queue.len(), remaining);
            assert!(state.is_showing);
        }

        state = reduce(state, QueueAction::ShowNext);
        assert!(state.current_notification.is_none());
        assert!(!state.is_showing);
        assert_eq!(state.total_count, 3);
        assert_eq!(state.phase(), QueuePhase::Idle);
    }

    #[test]
    fn test_show_next_keeps_remaining_order() {
        let items: Vec<_> = (1..=5).map(|n| item(n, &format!("Doc {}", n), 10)).collect();
        let mut state = NotificationQueueState::new();
        for it in &items {
            state = add(state, it);
        }
        state = reduce(state, QueueAction::ShowNext);
        assert_eq!(state.queue, items[1..].iter().cloned().collect::<VecDeque<_>>());
    }

    #[test]
    fn test_hide_keeps_current_and_queue() {
        let a = item(1, "Doc A", 10);
        let b = item(2, "Doc B", 11);
        let mut state = add(add(NotificationQueueState::new(), &a), &b);
        state = reduce(state, QueueAction::ShowNext);
        state = reduce(state, QueueAction::HideCurrent);

        assert_eq!(state.current_notification, Some(a));
        assert!(!state.is_showing);
        assert_eq!(state.queue.len(), 1);
        assert_eq!(state.total_count, 2);
        assert_eq!(state.phase(), QueuePhase::ShowingHidden);
        // A hidden current notification blocks auto-advance.
        assert!(!state.needs_auto_advance());
    }

    #[test]
    fn test_hide_when_idle_is_harmless() {
        let state = reduce(NotificationQueueState::new(), QueueAction::HideCurrent);
        assert_eq!(state, NotificationQueueState::new());
    }

    #[test]
    fn test_total_count_ignores_show_and_hide() {
        let mut state = NotificationQueueState::new();
        let actions = [
            QueueAction::AddNotification(item(1, "a", 1)),
            QueueAction::ShowNext,
            QueueAction::AddNotification(item(2, "b", 2)),
            QueueAction::HideCurrent,
            QueueAction::ShowNext,
            QueueAction::ShowNext,
            QueueAction::AddNotification(item(3, "c", 3)),
            QueueAction::HideCurrent,
        ];
        for action in actions {
            state.apply(action);
        }
        assert_eq!(state.total_count, 3);

        state.apply(QueueAction::ClearQueue);
        assert_eq!(state.total_count, 0);
        state.apply(QueueAction::AddNotification(item(4, "d", 4)));
        assert_eq!(state.total_count, 1);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = NotificationQueueState::new();
        for n in 1..=3 {
            state.apply(QueueAction::AddNotification(item(n, "x", 1)));
        }
        state.apply(QueueAction::ShowNext);
        state.apply(QueueAction::ClearQueue);
        assert_eq!(state, NotificationQueueState::new());
    }

    #[test]
    fn test_current_never_in_queue() {
        let mut state = NotificationQueueState::new();
        for n in 1..=3 {
            state.apply(QueueAction::AddNotification(item(n, "x", n)));
        }
        while state.phase() != QueuePhase::Idle {
            state.apply(QueueAction::ShowNext);
            if let Some(current) = &state.current_notification {
                assert!(!state.queue.contains(current));
            }
        }
    }
}
