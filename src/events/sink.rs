use super::Event;

/// Receiver of sync events.
///
/// Implemented for `crossbeam::channel::Sender<Event>` and boxed closures.
pub trait EventSink {
    fn send(&self, event: Event);
}

impl EventSink for crossbeam::channel::Sender<Event> {
    fn send(&self, event: Event) {
        // a disconnected receiver just stops listening
        let _ = crossbeam::channel::Sender::send(self, event);
    }
}

impl EventSink for Box<dyn Fn(Event)> {
    fn send(&self, event: Event) {
        (self)(event);
    }
}
