//! Locator strategies for finding elements.

use serde::{Deserialize, Serialize};

/// A locating strategy paired with its target string.
///
/// Drivers interpret the strategy; the wait engine only carries locators
/// into conditions and error messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath expression
    XPath(String),
    /// `id` attribute
    Id(String),
    /// `name` attribute
    Name(String),
    /// Single class name
    ClassName(String),
    /// Tag name
    TagName(String),
    /// Exact link text
    LinkText(String),
}

impl Locator {
    /// Create a CSS selector locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Create an `id` locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a `name` locator
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a class-name locator
    #[must_use]
    pub fn class_name(name: impl Into<String>) -> Self {
        Self::ClassName(name.into())
    }

    /// Create a tag-name locator
    #[must_use]
    pub fn tag_name(name: impl Into<String>) -> Self {
        Self::TagName(name.into())
    }

    /// Create a link-text locator
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Get the strategy name string
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::ClassName(_) => "class",
            Self::TagName(_) => "tag",
            Self::LinkText(_) => "link-text",
        }
    }

    /// Get the target string
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Css(s)
            | Self::XPath(s)
            | Self::Id(s)
            | Self::Name(s)
            | Self::ClassName(s)
            | Self::TagName(s)
            | Self::LinkText(s) => s,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy(), self.target())
    }
}
