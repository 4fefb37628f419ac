//! Readiness-gated element lookup.
//!
//! `find_element_when` and `find_elements_when` wrap the plain lookups with
//! a readiness gate chosen by a [`WaitForElement`] or [`WaitForElements`]
//! value, so call sites pick the gate with an argument instead of composing
//! a condition by hand.

use serde::{Deserialize, Serialize};

use crate::conditions;
use crate::context::SearchContext;
use crate::locator::Locator;
use crate::result::{EsperarError, EsperarResult};
use crate::wait::WaitUntil;

/// Readiness gate for a single-element lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitForElement {
    /// Look up immediately without waiting
    #[default]
    None,
    /// Wait until the element exists on the DOM
    Exists,
    /// Wait until the element is displayed
    Visible,
    /// Wait until the element is displayed and enabled
    Clickable,
}

/// Readiness gate for a multi-element lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitForElements {
    /// Look up immediately without waiting
    #[default]
    None,
    /// Wait until at least one matching element exists
    Exists,
    /// Wait until at least one matches and all matches are displayed
    Visible,
}

/// Lookup methods gated on element readiness.
///
/// Blanket-implemented for every [`SearchContext`], so the same calls work
/// on the root driver and on an element-scoped sub-context.
pub trait FindWait: SearchContext + Sized {
    /// Find the first element matching `locator`, first waiting for the
    /// readiness state `wait_for` under default timing.
    ///
    /// # Errors
    ///
    /// With [`WaitForElement::None`], a failed lookup surfaces immediately
    /// as [`EsperarError::Propagated`]. Otherwise the wait engine's error
    /// contract applies, including [`EsperarError::Timeout`].
    fn find_element_when(
        &self,
        locator: &Locator,
        wait_for: WaitForElement,
    ) -> EsperarResult<Self::Element> {
        match wait_for {
            WaitForElement::None => self.find_element(locator).map_err(EsperarError::from),
            WaitForElement::Exists => {
                self.wait_until(&conditions::element_exists(locator.clone()))
            }
            WaitForElement::Visible => {
                self.wait_until(&conditions::element_is_visible(locator.clone()))
            }
            WaitForElement::Clickable => {
                self.wait_until(&conditions::element_to_be_clickable(locator.clone()))
            }
        }
    }

    /// Find all elements matching `locator`, first waiting for the
    /// readiness state `wait_for` under default timing.
    ///
    /// # Errors
    ///
    /// With [`WaitForElements::None`], a failed lookup surfaces immediately
    /// as [`EsperarError::Propagated`]. Otherwise the wait engine's error
    /// contract applies, including [`EsperarError::Timeout`].
    fn find_elements_when(
        &self,
        locator: &Locator,
        wait_for: WaitForElements,
    ) -> EsperarResult<Vec<Self::Element>> {
        match wait_for {
            WaitForElements::None => self.find_elements(locator).map_err(EsperarError::from),
            WaitForElements::Exists => {
                self.wait_until(&conditions::presence_of_all_elements_located(
                    locator.clone(),
                ))
            }
            WaitForElements::Visible => {
                self.wait_until(&conditions::visibility_of_all_elements_located(
                    locator.clone(),
                ))
            }
        }
    }
}

impl<C: SearchContext> FindWait for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextErrorKind, Element};
    use crate::fake::FakeDriver;
    use std::time::Duration;

    mod single_element_tests {
        use super::*;

        #[test]
        fn test_none_bypasses_waiting() {
            let driver = FakeDriver::new();
            let result = driver.find_element_when(&Locator::id("missing"), WaitForElement::None);
            match result {
                Err(EsperarError::Propagated(err)) => {
                    assert!(err.is(ContextErrorKind::NotFound));
                }
                other => panic!("expected propagated lookup failure, got {other:?}"),
            }
        }

        #[test]
        fn test_none_returns_present_element() {
            let driver = FakeDriver::new();
            driver.add_element(Locator::id("main"));
            assert!(driver
                .find_element_when(&Locator::id("main"), WaitForElement::None)
                .is_ok());
        }

        #[test]
        fn test_exists_waits_for_late_element() {
            let driver = FakeDriver::new();
            let writer = driver.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                writer.add_element(Locator::id("late"));
            });
            assert!(driver
                .find_element_when(&Locator::id("late"), WaitForElement::Exists)
                .is_ok());
        }

        #[test]
        fn test_visible_waits_past_hidden_state() {
            let driver = FakeDriver::new();
            let element = driver.add_element(Locator::css(".panel"));
            element.set_displayed(false);
            let writer = element.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                writer.set_displayed(true);
            });
            let found = driver
                .find_element_when(&Locator::css(".panel"), WaitForElement::Visible)
                .unwrap();
            assert!(found.is_displayed().unwrap());
        }

        #[test]
        fn test_clickable_waits_for_enabled() {
            let driver = FakeDriver::new();
            let element = driver.add_element(Locator::css("button"));
            element.set_enabled(false);
            let writer = element.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                writer.set_enabled(true);
            });
            let found = driver
                .find_element_when(&Locator::css("button"), WaitForElement::Clickable)
                .unwrap();
            assert!(found.is_enabled().unwrap());
        }

        #[test]
        fn test_default_gate_is_none() {
            assert_eq!(WaitForElement::default(), WaitForElement::None);
            assert_eq!(WaitForElements::default(), WaitForElements::None);
        }
    }

    mod multi_element_tests {
        use super::*;

        #[test]
        fn test_none_returns_empty_set_immediately() {
            let driver = FakeDriver::new();
            let items = driver
                .find_elements_when(&Locator::tag_name("li"), WaitForElements::None)
                .unwrap();
            assert!(items.is_empty());
        }

        #[test]
        fn test_exists_waits_for_first_match() {
            let driver = FakeDriver::new();
            let writer = driver.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                writer.add_element(Locator::tag_name("li"));
                writer.add_element(Locator::tag_name("li"));
            });
            let items = driver
                .find_elements_when(&Locator::tag_name("li"), WaitForElements::Exists)
                .unwrap();
            assert_eq!(items.len(), 2);
        }

        #[test]
        fn test_visible_requires_all_displayed() {
            let driver = FakeDriver::new();
            driver.add_element(Locator::tag_name("li"));
            let hidden = driver.add_element(Locator::tag_name("li"));
            hidden.set_displayed(false);
            let writer = hidden.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                writer.set_displayed(true);
            });
            let items = driver
                .find_elements_when(&Locator::tag_name("li"), WaitForElements::Visible)
                .unwrap();
            assert_eq!(items.len(), 2);
        }

        #[test]
        fn test_element_scoped_context() {
            let driver = FakeDriver::new();
            let form = driver.add_element(Locator::id("form"));
            driver.add_element(Locator::name("q"));
            assert!(form
                .find_element_when(&Locator::name("q"), WaitForElement::Exists)
                .is_ok());
        }
    }
}
