use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

#[cfg(feature = "events")]
use crate::events::{Event, EventSink, PayloadScheduled};
use crate::{DomError, Host, Offset, Settings};

/// Inline property that pins the banner under the header.
const BANNER_TOP: &str = "top";

/// Lifecycle of a [`HeaderOffsetSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, `start` not called yet.
    Idle,
    /// Document was still loading at `start`; setup waits for the ready signal.
    AwaitingDocumentReady,
    /// Initial recompute done, listening for resizes and mutations.
    Active,
    /// Terminal. Timer cancelled and every subscription dropped.
    Stopped,
}

/// Result of a single recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The property holds `offset.total()`.
    Published(Offset),
    /// No header in the document, nothing written.
    HeaderMissing,
    /// A host fault was swallowed; the previous value stays in place.
    Failed(DomError),
}

/// Keeps a root custom property equal to the header height, plus the banner
/// height when a banner sits under it.
///
/// The instance owns its debounce timer and host subscriptions. Cloning is
/// cheap and yields a handle to the same sync.
pub struct HeaderOffsetSync<H: Host> {
    inner: Rc<Inner<H>>,
}

impl<H: Host> Clone for HeaderOffsetSync<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct Inner<H: Host> {
    host: H,
    settings: Settings,
    state: RefCell<State<H>>,

    #[cfg(feature = "events")]
    events_sink: RefCell<Option<Box<dyn EventSink>>>,
}

struct State<H: Host> {
    phase: Phase,
    pending: Option<H::Timer>,
    ready: Option<H::Subscription>,
    subscriptions: Vec<H::Subscription>,
    last_published: Option<Offset>,
}

impl<H: Host> Default for State<H> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            pending: None,
            ready: None,
            subscriptions: Vec::new(),
            last_published: None,
        }
    }
}

impl<H: Host + 'static> HeaderOffsetSync<H> {
    pub fn new(host: H, settings: Settings) -> Self {
        Self {
            inner: Rc::new(Inner {
                host,
                settings,
                state: RefCell::new(State::default()),
                #[cfg(feature = "events")]
                events_sink: RefCell::new(None),
            }),
        }
    }

    #[cfg(feature = "events")]
    /// Supply a sink that receives an [`Event`] for every recompute and every armed debounce.
    pub fn with_event_sink(self, sink: impl EventSink + 'static) -> Self {
        *self.inner.events_sink.borrow_mut() = Some(Box::new(sink));
        self
    }

    #[cfg(feature = "events")]
    /// Shortcut for [`Self::with_event_sink`] with a crossbeam channel.
    pub fn with_events(self, events_publisher: crossbeam::channel::Sender<Event>) -> Self {
        self.with_event_sink(events_publisher)
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase
    }

    /// Offset written by the last successful recompute.
    pub fn last_published(&self) -> Option<Offset> {
        self.inner.state.borrow().last_published
    }

    /// Runs setup now, or once the document is ready if it is still loading.
    /// Only the first call on an idle sync has any effect.
    pub fn start(&self) {
        if self.phase() != Phase::Idle {
            trace!(phase = ?self.phase(), "header offset sync already started");
            return;
        }

        if !self.inner.host.ready_state().is_loading() {
            Inner::activate(&self.inner);
            return;
        }

        self.inner.state.borrow_mut().phase = Phase::AwaitingDocumentReady;
        debug!("document loading, deferring header offset setup");

        let weak = Rc::downgrade(&self.inner);
        match self.inner.host.on_ready(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::activate(&inner);
            }
        })) {
            Ok(subscription) => self.inner.state.borrow_mut().ready = Some(subscription),
            Err(err) => {
                debug!(%err, "ready listener unavailable, setting up now");
                Inner::activate(&self.inner);
            }
        }
    }

    /// Cancels the pending recompute and drops every host subscription.
    pub fn stop(&self) {
        let (pending, ready, subscriptions) = {
            let mut state = self.inner.state.borrow_mut();
            if state.phase == Phase::Stopped {
                return;
            }
            state.phase = Phase::Stopped;
            (
                state.pending.take(),
                state.ready.take(),
                std::mem::take(&mut state.subscriptions),
            )
        };

        if let Some(timer) = pending {
            self.inner.host.cancel(timer);
        }
        drop(ready);
        drop(subscriptions);
        debug!("header offset sync stopped");
    }

    /// Measures and publishes now. Faults never escape; see [`Outcome`].
    pub fn recompute(&self) -> Outcome {
        self.inner.recompute()
    }

    /// Replaces any pending recompute with one that runs after the debounce window.
    pub fn schedule_recompute(&self) {
        Inner::schedule(&self.inner);
    }
}

impl<H: Host + 'static> Inner<H> {
    fn activate(inner: &Rc<Self>) {
        {
            let mut state = inner.state.borrow_mut();
            match state.phase {
                Phase::Idle | Phase::AwaitingDocumentReady => state.phase = Phase::Active,
                Phase::Active | Phase::Stopped => return,
            }
        }
        debug!("header offset sync active");

        inner.recompute();

        let weak = Rc::downgrade(inner);
        match inner.host.on_resize(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::schedule(&inner);
            }
        })) {
            Ok(subscription) => inner.state.borrow_mut().subscriptions.push(subscription),
            Err(err) => debug!(%err, "resize listener unavailable"),
        }

        if inner.settings.observe_mutations {
            Inner::observe(inner);
        }
    }

    /// Watches the header and, when present now, the banner.
    fn observe(inner: &Rc<Self>) {
        let settings = &inner.settings;
        let selectors =
            std::iter::once(&settings.header_selector).chain(settings.banner_selector.as_ref());

        for selector in selectors {
            let target = match inner.host.find(selector) {
                Ok(Some(target)) => target,
                Ok(None) => continue,
                Err(err) => {
                    debug!(%err, "cannot observe `{selector}`");
                    continue;
                }
            };

            let weak = Rc::downgrade(inner);
            match inner.host.on_change(&target, Self::recompute_callback(weak)) {
                Ok(Some(subscription)) => {
                    inner.state.borrow_mut().subscriptions.push(subscription);
                }
                Ok(None) => {
                    debug!("mutation observation unavailable");
                    return;
                }
                Err(err) => debug!(%err, "cannot observe `{selector}`"),
            }
        }
    }

    fn recompute_callback(weak: Weak<Self>) -> Box<dyn FnMut()> {
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.recompute();
            }
        })
    }

    fn schedule(inner: &Rc<Self>) {
        let previous = {
            let mut state = inner.state.borrow_mut();
            if state.phase == Phase::Stopped {
                return;
            }
            state.pending.take()
        };
        if let Some(timer) = previous {
            inner.host.cancel(timer);
        }

        let delay = inner.settings.debounce();
        let weak = Rc::downgrade(inner);
        let task = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.recompute();
            }
        });

        match inner.host.schedule_after(delay, task) {
            Ok(timer) => {
                // the fired timer stays here until replaced; dropping it
                // inside its own callback would free the running closure
                inner.state.borrow_mut().pending = Some(timer);
                trace!(?delay, "header offset recompute scheduled");
                #[cfg(feature = "events")]
                inner.publish_event(Event::Scheduled(PayloadScheduled {
                    delay_ms: inner.settings.debounce_ms,
                }));
            }
            Err(err) => debug!(%err, "cannot schedule header offset recompute"),
        }
    }

    fn recompute(&self) -> Outcome {
        let outcome = match self.measure_and_publish() {
            Ok(Some(offset)) => {
                self.state.borrow_mut().last_published = Some(offset);
                debug!(total = %offset.total(), "header offset published");
                Outcome::Published(offset)
            }
            Ok(None) => {
                trace!(selector = %self.settings.header_selector, "no header, skipping");
                Outcome::HeaderMissing
            }
            Err(err) => {
                debug!(%err, "header offset recompute failed");
                Outcome::Failed(err)
            }
        };

        #[cfg(feature = "events")]
        self.publish_event(Event::from(&outcome));

        outcome
    }

    fn measure_and_publish(&self) -> Result<Option<Offset>, DomError> {
        let host = &self.host;
        let Some(header) = host.find(&self.settings.header_selector)? else {
            return Ok(None);
        };
        let header_height = host.outer_height(&header)?;

        let banner = match &self.settings.banner_selector {
            Some(selector) => host.find(selector)?,
            None => None,
        };
        let banner_height = match banner {
            Some(banner) => {
                self.write(&banner, BANNER_TOP, &header_height.to_string())?;
                Some(host.outer_height(&banner)?)
            }
            None => None,
        };

        let offset = Offset::new(header_height, banner_height);
        let root = host.root()?;
        self.write(&root, &self.settings.property, &offset.total().to_string())?;
        Ok(Some(offset))
    }

    /// Skips the write when the value is already in place, so an observed
    /// element is not mutated again by its own recompute.
    fn write(&self, element: &H::Element, name: &str, value: &str) -> Result<(), DomError> {
        if self.host.style_property(element, name)?.as_deref() == Some(value) {
            trace!(name, value, "style unchanged");
            return Ok(());
        }
        self.host.set_style_property(element, name, value)
    }

    #[cfg(feature = "events")]
    fn publish_event(&self, event: Event) {
        if let Some(sink) = self.events_sink.borrow().as_ref() {
            sink.send(event);
        }
    }
}

impl<H: Host> Drop for Inner<H> {
    fn drop(&mut self) {
        if let Some(timer) = self.state.get_mut().pending.take() {
            self.host.cancel(timer);
        }
    }
}
