use crate::Px;

/// Document loading phase, mirroring `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Maps the raw `readyState` string. Anything unknown counts as complete so
    /// setup is never deferred on a signal that will not come.
    pub fn from_document_state(state: &str) -> Self {
        match state {
            "loading" => ReadyState::Loading,
            "interactive" => ReadyState::Interactive,
            _ => ReadyState::Complete,
        }
    }

    pub fn is_loading(self) -> bool {
        self == ReadyState::Loading
    }
}

/// Faults reported by a host while querying, measuring or styling elements.
///
/// None of these ever reach the page: [`crate::HeaderOffsetSync`] swallows
/// them at the boundary of each recompute.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("query `{selector}` failed: {reason}")]
    Query { selector: String, reason: String },

    #[error("measurement failed: {reason}")]
    Measure { reason: String },

    #[error("setting `{property}` failed: {reason}")]
    Style { property: String, reason: String },

    #[error("document has no root element")]
    NoRoot,

    #[error("subscribing to `{event}` failed: {reason}")]
    Subscribe { event: String, reason: String },

    #[error("scheduling a timer failed: {reason}")]
    Timer { reason: String },
}

/// Narrow view of the document: find elements, measure them, write styles.
pub trait ElementSource {
    type Element: Clone;

    fn ready_state(&self) -> ReadyState;

    /// First element matching `selector`, if any.
    ///
    /// # Errors
    /// Fails when the selector cannot be evaluated.
    fn find(&self, selector: &str) -> Result<Option<Self::Element>, DomError>;

    /// The document root (`<html>`), which carries the custom property.
    ///
    /// # Errors
    /// Fails when the document has no usable root element.
    fn root(&self) -> Result<Self::Element, DomError>;

    /// Rendered border-box height of `element`.
    ///
    /// # Errors
    /// Fails when layout cannot be read.
    fn outer_height(&self, element: &Self::Element) -> Result<Px, DomError>;

    /// Current inline value of a style property, `None` when unset.
    ///
    /// # Errors
    /// Fails when the inline style cannot be read.
    fn style_property(&self, element: &Self::Element, name: &str)
        -> Result<Option<String>, DomError>;

    /// # Errors
    /// Fails when the host rejects the assignment.
    fn set_style_property(
        &self,
        element: &Self::Element,
        name: &str,
        value: &str,
    ) -> Result<(), DomError>;
}
