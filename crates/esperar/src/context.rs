//! Context capability traits and the closed error-kind set.
//!
//! The wait engine never talks to a browser directly. It reads through a
//! small capability surface: a [`SearchContext`] can locate elements, an
//! [`Element`] is a located node that is itself a search context, and a
//! [`Driver`] adds the page-level operations (title, URL, frame and alert
//! switching). Any driver backend can plug in by implementing these traits;
//! [`crate::fake`] is the in-memory reference implementation.
//!
//! Failures carry a [`ContextErrorKind`] from a closed set, so the engine
//! classifies errors by kind rather than by downcasting error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locator::Locator;

/// Result type for context operations
pub type ContextResult<T> = Result<T, ContextError>;

/// Classification of a failed context operation.
///
/// This set is closed: every failure a driver reports during condition
/// evaluation maps to exactly one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextErrorKind {
    /// No element matched the locator
    NotFound,
    /// A previously located element no longer corresponds to a live node
    StaleReference,
    /// The requested frame does not exist
    NoSuchFrame,
    /// No alert is currently open
    NoAlertPresent,
}

impl ContextErrorKind {
    /// Get the kind name string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::StaleReference => "stale reference",
            Self::NoSuchFrame => "no such frame",
            Self::NoAlertPresent => "no alert present",
        }
    }
}

impl std::fmt::Display for ContextErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised by a context operation
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ContextError {
    kind: ContextErrorKind,
    message: String,
}

impl ContextError {
    /// Create a new context error
    #[must_use]
    pub fn new(kind: ContextErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Get the error kind
    #[must_use]
    pub const fn kind(&self) -> ContextErrorKind {
        self.kind
    }

    /// Get the error message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this error is of the given kind
    #[must_use]
    pub fn is(&self, kind: ContextErrorKind) -> bool {
        self.kind == kind
    }
}

/// Identifies the frame a driver should switch into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameTarget {
    /// The frame's `id` or `name` attribute
    NameOrId(String),
    /// Locate the frame element first, then switch into it
    Locator(Locator),
}

impl FrameTarget {
    /// Target a frame by its `id` or `name` attribute
    #[must_use]
    pub fn name_or_id(name: impl Into<String>) -> Self {
        Self::NameOrId(name.into())
    }

    /// Target a frame through an element locator
    #[must_use]
    pub const fn locator(locator: Locator) -> Self {
        Self::Locator(locator)
    }
}

impl std::fmt::Display for FrameTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameOrId(name) => write!(f, "frame \"{name}\""),
            Self::Locator(locator) => write!(f, "frame at {locator}"),
        }
    }
}

/// A handle through which elements can be located.
///
/// Both the root driver and an already-located element implement this, so
/// the wait engine serves both through one generic contract. The engine
/// only reads through the handle; it never takes ownership.
pub trait SearchContext {
    /// The element handle type produced by lookups
    type Element: Element;

    /// Locate the first element matching the locator.
    ///
    /// # Errors
    ///
    /// Fails with [`ContextErrorKind::NotFound`] when nothing matches, or
    /// [`ContextErrorKind::StaleReference`] when the context itself is an
    /// element that is no longer attached.
    fn find_element(&self, locator: &Locator) -> ContextResult<Self::Element>;

    /// Locate all elements matching the locator; an empty vec when nothing
    /// matches.
    ///
    /// # Errors
    ///
    /// Fails with [`ContextErrorKind::StaleReference`] when the context
    /// itself is an element that is no longer attached.
    fn find_elements(&self, locator: &Locator) -> ContextResult<Vec<Self::Element>>;
}

/// A located DOM node.
///
/// Every read can fail with [`ContextErrorKind::StaleReference`] if the
/// underlying page has mutated since the handle was obtained; staleness is
/// signaled by that error, never by a flag.
pub trait Element: SearchContext<Element = Self> + Clone {
    /// Whether the element is displayed with a positive rendered size
    fn is_displayed(&self) -> ContextResult<bool>;

    /// Whether the element is enabled
    fn is_enabled(&self) -> ContextResult<bool>;

    /// Whether the element is selected (checkboxes, options, radios)
    fn is_selected(&self) -> ContextResult<bool>;

    /// Read an attribute; `None` when the attribute is absent
    fn attribute(&self, name: &str) -> ContextResult<Option<String>>;

    /// The element's visible text
    fn text(&self) -> ContextResult<String>;
}

/// A handle to an open alert dialog
pub trait Alert {
    /// The alert's message text
    fn text(&self) -> ContextResult<String>;

    /// Accept the alert, closing it
    fn accept(&self) -> ContextResult<()>;

    /// Dismiss the alert, closing it
    fn dismiss(&self) -> ContextResult<()>;
}

/// The root context: page-level reads plus frame and alert switching.
pub trait Driver: SearchContext {
    /// The alert handle type
    type Alert: Alert;

    /// The current page title
    fn title(&self) -> ContextResult<String>;

    /// The current page URL
    fn url(&self) -> ContextResult<String>;

    /// Switch the active browsing context into the given frame.
    ///
    /// # Errors
    ///
    /// Fails with [`ContextErrorKind::NoSuchFrame`] when the frame does not
    /// exist, or [`ContextErrorKind::NotFound`] when a locator target
    /// matches no element.
    fn switch_to_frame(&self, target: &FrameTarget) -> ContextResult<()>;

    /// Switch to the currently open alert.
    ///
    /// # Errors
    ///
    /// Fails with [`ContextErrorKind::NoAlertPresent`] when no alert is
    /// open.
    fn switch_to_alert(&self) -> ContextResult<Self::Alert>;
}
