use std::time::Duration;

use crate::{DomError, ElementSource};

/// Work run once by the host, e.g. when a timer elapses.
pub type Task = Box<dyn FnOnce()>;

/// Work run every time a host event fires.
pub type Callback = Box<dyn FnMut()>;

/// Host event loop: timers plus the notifications the sync reacts to.
///
/// Subscriptions unregister themselves when dropped.
pub trait Scheduler {
    /// What `on_change` can observe.
    type Target;
    type Timer;
    type Subscription;

    /// Runs `task` once after `delay`.
    ///
    /// # Errors
    /// Fails when the host cannot arm a timer.
    fn schedule_after(&self, delay: Duration, task: Task) -> Result<Self::Timer, DomError>;

    /// Prevents a timer from firing. Cancelling an elapsed timer is a no-op.
    fn cancel(&self, timer: Self::Timer);

    /// Viewport resize notifications.
    ///
    /// # Errors
    /// Fails when the listener cannot be registered.
    fn on_resize(&self, callback: Callback) -> Result<Self::Subscription, DomError>;

    /// Attribute, child list and subtree changes of `target`.
    ///
    /// Returns `Ok(None)` when the host has no mutation observation.
    ///
    /// # Errors
    /// Fails when observation is available but cannot be started.
    fn on_change(
        &self,
        target: &Self::Target,
        callback: Callback,
    ) -> Result<Option<Self::Subscription>, DomError>;

    /// Fires once when the document finishes parsing.
    ///
    /// # Errors
    /// Fails when the listener cannot be registered.
    fn on_ready(&self, task: Task) -> Result<Self::Subscription, DomError>;
}

/// Everything [`crate::HeaderOffsetSync`] needs from its environment.
pub trait Host: ElementSource + Scheduler<Target = <Self as ElementSource>::Element> {}

impl<T> Host for T where T: ElementSource + Scheduler<Target = <T as ElementSource>::Element> {}
