mod event;
mod sink;

pub use event::{Event, PayloadFailed, PayloadPublished, PayloadScheduled};

pub use sink::EventSink;
