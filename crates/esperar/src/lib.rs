//! Esperar: Conditional Waiting for Browser Automation
//!
//! Esperar (Spanish: "to wait/hope") turns flaky sleep-based test code into
//! explicit conditional waits: a blocking poll engine, a library of
//! ready-made expected conditions, and readiness-gated element lookup, all
//! generic over a small set of driver capability traits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    ESPERAR Architecture                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐    ┌─────────────┐    ┌───────────────────┐  │
//! │  │ Conditions │───►│ Poll Engine │───►│ SearchContext /   │  │
//! │  │ (factory   │    │ (wait +     │    │ Driver / Element  │  │
//! │  │  library)  │    │  options)   │    │ (your backend)    │  │
//! │  └────────────┘    └─────────────┘    └───────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use esperar::conditions;
//! use esperar::fake::FakeDriver;
//! use esperar::{FindWait, Locator, WaitForElement, WaitUntil};
//!
//! let driver = FakeDriver::new();
//! driver.set_title("Example Domain");
//! driver.add_element(Locator::css("button.primary"));
//!
//! driver.wait_until(&conditions::title_contains("Example"))?;
//! let button = driver.find_element_when(
//!     &Locator::css("button.primary"),
//!     WaitForElement::Clickable,
//! )?;
//! # let _ = button;
//! # Ok::<(), esperar::EsperarError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod conditions;
pub mod context;
pub mod fake;
pub mod find;
pub mod locator;
pub mod result;
pub mod wait;

pub use context::{
    Alert, ContextError, ContextErrorKind, ContextResult, Driver, Element, FrameTarget,
    SearchContext,
};
pub use find::{FindWait, WaitForElement, WaitForElements};
pub use locator::Locator;
pub use result::{EsperarError, EsperarResult};
pub use wait::{
    wait, Condition, ConditionOutcome, FnCondition, WaitOptions, WaitUntil,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
