//! Publishes the rendered height of the page header (plus an optional banner
//! stacked under it) as a CSS custom property on the document root, so
//! stylesheets can clear it with `var(--header-height)`.
//!
//! The logic is host-agnostic: the document sits behind [`ElementSource`] and
//! the event loop behind [`Scheduler`]. The `header-offset-web` crate
//! implements both on top of `web-sys`.

mod dom;
mod px;
mod scheduler;
mod settings;
mod sync;

#[cfg(feature = "events")]
pub mod events;

pub use self::dom::{DomError, ElementSource, ReadyState};
pub use self::px::{Offset, Px};
pub use self::scheduler::{Callback, Host, Scheduler, Task};
pub use self::settings::{
    Settings, SettingsError, DEFAULT_BANNER_SELECTOR, DEFAULT_DEBOUNCE_MS,
    DEFAULT_HEADER_SELECTOR, DEFAULT_PROPERTY,
};
pub use self::sync::{HeaderOffsetSync, Outcome, Phase};
