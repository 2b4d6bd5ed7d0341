//! # Notification Queue Driver
//!
//! Runs the queue state machine on its own task and adds the time-based
//! behaviour the reducer cannot express on its own:
//!
//! 1.  **Auto-advance**: after every transition, if items are waiting and no
//!     notification is current, a `ShowNext` is applied immediately.
//! 2.  **Display timer**: entering `Showing` arms a countdown that dispatches
//!     `HideCurrent` when it expires.
//! 3.  **Cooldown timer**: hiding the current notification arms a countdown
//!     that dispatches `ShowNext` when it expires.
//!
//! At most one timer is pending. Arming a timer replaces the previous one, and
//! clearing the queue disarms it, so a stale countdown can never act on a
//! notification it was not armed for.
//!
//! The task is the only owner of the state. Callers talk to it through a
//! cloneable [`NotificationQueueHandle`]: actions travel over an unbounded mpsc
//! channel and every resulting state is published on a `watch` channel.
//! Cancelling the handle's token stops the task; no timer fires and no state
//! is published afterwards.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::notification_queue::{NotificationQueueState, QueueAction};
use crate::documents::model::NotificationItem;

/// Default time a notification stays visible.
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_millis(5000);
/// Default pause between hiding one notification and showing the next.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(2000);

/// Countdown lengths used by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueTimings {
    /// How long a notification is shown before it is hidden.
    pub display: Duration,
    /// How long to wait after a hide before showing the next notification.
    pub cooldown: Duration,
}

impl QueueTimings {
    /// Timings from a display duration and a cooldown.
    pub fn new(display: Duration, cooldown: Duration) -> Self {
        Self { display, cooldown }
    }

    /// Timings from millisecond values, as stored in configuration.
    pub fn from_millis(display_ms: u64, cooldown_ms: u64) -> Self {
        Self {
            display: Duration::from_millis(display_ms),
            cooldown: Duration::from_millis(cooldown_ms),
        }
    }
}

impl Default for QueueTimings {
    fn default() -> Self {
        Self {
            display: DEFAULT_DISPLAY_DURATION,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingTimer {
    Display(Instant),
    Cooldown(Instant),
}

impl PendingTimer {
    fn deadline(self) -> Instant {
        match self {
            PendingTimer::Display(at) | PendingTimer::Cooldown(at) => at,
        }
    }

    /// The action dispatched when this timer expires.
    fn action(self) -> QueueAction {
        match self {
            PendingTimer::Display(_) => QueueAction::HideCurrent,
            PendingTimer::Cooldown(_) => QueueAction::ShowNext,
        }
    }
}

struct Driver {
    state: NotificationQueueState,
    timings: QueueTimings,
    timer: Option<PendingTimer>,
    publisher: watch::Sender<NotificationQueueState>,
}

impl Driver {
    fn dispatch(&mut self, action: QueueAction) {
        let was_showing = self.state.is_showing;
        let rearm = match &action {
            QueueAction::AddNotification(_) => None,
            QueueAction::ShowNext => Some(true),
            QueueAction::HideCurrent => Some(was_showing),
            QueueAction::ClearQueue => Some(true),
        };

        log::debug!("Queue action {:?}", action);
        self.state.apply(action);

        if rearm == Some(true) {
            self.timer = self.next_timer();
        }

        if self.state.needs_auto_advance() {
            self.state.apply(QueueAction::ShowNext);
            self.timer = self.next_timer();
        }

        self.publisher.send_replace(self.state.clone());
    }

    /// The timer implied by the current phase right after a transition.
    fn next_timer(&self) -> Option<PendingTimer> {
        let now = Instant::now();
        match (&self.state.current_notification, self.state.is_showing) {
            (Some(_), true) => Some(PendingTimer::Display(now + self.timings.display)),
            (Some(_), false) => Some(PendingTimer::Cooldown(now + self.timings.cooldown)),
            (None, _) => None,
        }
    }

    fn fire_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.dispatch(timer.action());
        }
    }

    async fn run(mut self, mut actions: mpsc::UnboundedReceiver<QueueAction>, token: CancellationToken) {
        loop {
            let deadline = self.timer.map(PendingTimer::deadline);
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log::info!("Notification queue shut down");
                    break;
                }
                received = actions.recv() => match received {
                    Some(action) => self.dispatch(action),
                    None => {
                        log::debug!("All notification queue handles dropped");
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire_timer();
                }
            }
        }
    }
}

/// Entry point for starting a queue driver.
pub struct NotificationQueue;

impl NotificationQueue {
    /// Spawns a driver with its own shutdown token.
    pub fn spawn(timings: QueueTimings) -> NotificationQueueHandle {
        Self::spawn_with_token(timings, CancellationToken::new())
    }

    /// Spawns a driver that stops when `token` is cancelled. Must be called
    /// from within a tokio runtime.
    pub fn spawn_with_token(timings: QueueTimings, token: CancellationToken) -> NotificationQueueHandle {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(NotificationQueueState::new());

        let driver = Driver {
            state: NotificationQueueState::new(),
            timings,
            timer: None,
            publisher: state_tx,
        };
        tokio::spawn(driver.run(action_rx, token.clone()));
        log::info!(
            "Notification queue started (display {:?}, cooldown {:?})",
            timings.display,
            timings.cooldown
        );

        NotificationQueueHandle {
            actions: action_tx,
            state: state_rx,
            token,
        }
    }
}

/// Cloneable access to a running queue driver.
#[derive(Debug, Clone)]
pub struct NotificationQueueHandle {
    actions: mpsc::UnboundedSender<QueueAction>,
    state: watch::Receiver<NotificationQueueState>,
    token: CancellationToken,
}

impl NotificationQueueHandle {
    /// Sends `action` to the driver. Returns `false` once the driver has
    /// stopped.
    pub fn dispatch(&self, action: QueueAction) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.actions.send(action).is_ok()
    }

    /// Enqueues a notification.
    pub fn add(&self, item: NotificationItem) -> bool {
        self.dispatch(QueueAction::AddNotification(item))
    }

    /// Shows the next notification now.
    pub fn show_next(&self) -> bool {
        self.dispatch(QueueAction::ShowNext)
    }

    /// Dismisses the visible notification; the cooldown starts immediately.
    pub fn hide_current(&self) -> bool {
        self.dispatch(QueueAction::HideCurrent)
    }

    /// Drops every pending notification and resets the counter.
    pub fn clear(&self) -> bool {
        self.dispatch(QueueAction::ClearQueue)
    }

    /// The most recently published state.
    pub fn state(&self) -> NotificationQueueState {
        self.state.borrow().clone()
    }

    /// A receiver notified after every transition.
    pub fn subscribe(&self) -> watch::Receiver<NotificationQueueState> {
        self.state.clone()
    }

    /// The token that stops the driver.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stops the driver and cancels any pending timer.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// True once `shutdown` has been called.
    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the driver task has exited.
    pub async fn closed(&self) {
        self.actions.closed().await
    }
}
