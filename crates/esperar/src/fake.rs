//! In-memory fake browser for tests and examples.
//!
//! [`FakeDriver`] implements the [`crate::context`] capability traits over a
//! scripted page model: title, URL, frames, an optional alert and a flat set
//! of element records. Handles are cheap clones over shared state, so a test
//! can mutate the page from another thread while a wait is polling. Element
//! lookups are page-global; parent/child scoping is not modeled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::context::{
    Alert, ContextError, ContextErrorKind, ContextResult, Driver, Element, FrameTarget,
    SearchContext,
};
use crate::locator::Locator;

#[derive(Debug, Default)]
struct PageState {
    title: String,
    url: String,
    alert_text: Option<String>,
    frames: Vec<String>,
    current_frame: Option<String>,
    elements: Vec<ElementState>,
}

#[derive(Debug)]
struct ElementState {
    locator: Locator,
    attached: bool,
    displayed: bool,
    enabled: bool,
    selected: bool,
    text: String,
    attributes: HashMap<String, String>,
}

impl PageState {
    fn matching(&self, locator: &Locator) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.attached && e.locator == *locator)
            .map(|(index, _)| index)
            .collect()
    }
}

fn no_element(locator: &Locator) -> ContextError {
    ContextError::new(
        ContextErrorKind::NotFound,
        format!("no element matching {locator}"),
    )
}

/// Scripted in-memory driver
#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<PageState>>,
}

impl FakeDriver {
    /// Create an empty page with a blank URL
    #[must_use]
    pub fn new() -> Self {
        let driver = Self::default();
        driver.lock().url = String::from("about:blank");
        driver
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().expect("fake page state poisoned")
    }

    /// Set the page title
    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().title = title.into();
    }

    /// Set the page URL
    pub fn set_url(&self, url: impl Into<String>) {
        self.lock().url = url.into();
    }

    /// Open an alert with the given message
    pub fn open_alert(&self, text: impl Into<String>) {
        self.lock().alert_text = Some(text.into());
    }

    /// Register a frame by name
    pub fn add_frame(&self, name: impl Into<String>) {
        self.lock().frames.push(name.into());
    }

    /// The frame the driver is currently switched into, if any
    #[must_use]
    pub fn current_frame(&self) -> Option<String> {
        self.lock().current_frame.clone()
    }

    /// Add an element matching `locator`, displayed and enabled by default,
    /// and return its handle.
    pub fn add_element(&self, locator: Locator) -> FakeElement {
        let mut state = self.lock();
        state.elements.push(ElementState {
            locator,
            attached: true,
            displayed: true,
            enabled: true,
            selected: false,
            text: String::new(),
            attributes: HashMap::new(),
        });
        FakeElement {
            state: self.state.clone(),
            index: state.elements.len() - 1,
        }
    }
}

impl SearchContext for FakeDriver {
    type Element = FakeElement;

    fn find_element(&self, locator: &Locator) -> ContextResult<FakeElement> {
        let state = self.lock();
        state
            .matching(locator)
            .first()
            .map(|&index| FakeElement {
                state: self.state.clone(),
                index,
            })
            .ok_or_else(|| no_element(locator))
    }

    fn find_elements(&self, locator: &Locator) -> ContextResult<Vec<FakeElement>> {
        let state = self.lock();
        Ok(state
            .matching(locator)
            .into_iter()
            .map(|index| FakeElement {
                state: self.state.clone(),
                index,
            })
            .collect())
    }
}

impl Driver for FakeDriver {
    type Alert = FakeAlert;

    fn title(&self) -> ContextResult<String> {
        Ok(self.lock().title.clone())
    }

    fn url(&self) -> ContextResult<String> {
        Ok(self.lock().url.clone())
    }

    fn switch_to_frame(&self, target: &FrameTarget) -> ContextResult<()> {
        let name = match target {
            FrameTarget::NameOrId(name) => name.clone(),
            FrameTarget::Locator(locator) => {
                let element = self.find_element(locator)?;
                element.attribute("name")?.ok_or_else(|| {
                    ContextError::new(
                        ContextErrorKind::NoSuchFrame,
                        format!("element {locator} has no frame name"),
                    )
                })?
            }
        };
        let mut state = self.lock();
        if state.frames.contains(&name) {
            state.current_frame = Some(name);
            Ok(())
        } else {
            Err(ContextError::new(
                ContextErrorKind::NoSuchFrame,
                format!("no frame named \"{name}\""),
            ))
        }
    }

    fn switch_to_alert(&self) -> ContextResult<FakeAlert> {
        if self.lock().alert_text.is_some() {
            Ok(FakeAlert {
                state: self.state.clone(),
            })
        } else {
            Err(ContextError::new(
                ContextErrorKind::NoAlertPresent,
                "no alert is open",
            ))
        }
    }
}

/// Handle to one element record of a [`FakeDriver`] page
#[derive(Debug, Clone)]
pub struct FakeElement {
    state: Arc<Mutex<PageState>>,
    index: usize,
}

impl FakeElement {
    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().expect("fake page state poisoned")
    }

    fn read<T>(&self, read: impl FnOnce(&ElementState) -> T) -> ContextResult<T> {
        let state = self.lock();
        let record = &state.elements[self.index];
        if record.attached {
            Ok(read(record))
        } else {
            Err(ContextError::new(
                ContextErrorKind::StaleReference,
                format!("element {} is no longer attached", record.locator),
            ))
        }
    }

    fn update(&self, update: impl FnOnce(&mut ElementState)) {
        let mut state = self.lock();
        update(&mut state.elements[self.index]);
    }

    /// Set whether the element is displayed
    pub fn set_displayed(&self, displayed: bool) {
        self.update(|record| record.displayed = displayed);
    }

    /// Set whether the element is enabled
    pub fn set_enabled(&self, enabled: bool) {
        self.update(|record| record.enabled = enabled);
    }

    /// Set whether the element is selected
    pub fn set_selected(&self, selected: bool) {
        self.update(|record| record.selected = selected);
    }

    /// Set the element's text
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|record| record.text = text);
    }

    /// Set an attribute value
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        self.update(|record| {
            record.attributes.insert(name, value);
        });
    }

    /// Remove the element from the page. Existing handles raise
    /// [`ContextErrorKind::StaleReference`] on every subsequent read, and
    /// lookups no longer see the element.
    pub fn detach(&self) {
        self.update(|record| record.attached = false);
    }
}

impl SearchContext for FakeElement {
    type Element = FakeElement;

    fn find_element(&self, locator: &Locator) -> ContextResult<FakeElement> {
        self.read(|_| ())?;
        let state = self.lock();
        state
            .matching(locator)
            .first()
            .map(|&index| FakeElement {
                state: self.state.clone(),
                index,
            })
            .ok_or_else(|| no_element(locator))
    }

    fn find_elements(&self, locator: &Locator) -> ContextResult<Vec<FakeElement>> {
        self.read(|_| ())?;
        let state = self.lock();
        Ok(state
            .matching(locator)
            .into_iter()
            .map(|index| FakeElement {
                state: self.state.clone(),
                index,
            })
            .collect())
    }
}

impl Element for FakeElement {
    fn is_displayed(&self) -> ContextResult<bool> {
        self.read(|record| record.displayed)
    }

    fn is_enabled(&self) -> ContextResult<bool> {
        self.read(|record| record.enabled)
    }

    fn is_selected(&self) -> ContextResult<bool> {
        self.read(|record| record.selected)
    }

    fn attribute(&self, name: &str) -> ContextResult<Option<String>> {
        self.read(|record| record.attributes.get(name).cloned())
    }

    fn text(&self) -> ContextResult<String> {
        self.read(|record| record.text.clone())
    }
}

/// Handle to the page's open alert
#[derive(Debug, Clone)]
pub struct FakeAlert {
    state: Arc<Mutex<PageState>>,
}

impl FakeAlert {
    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().expect("fake page state poisoned")
    }

    fn close(&self) -> ContextResult<()> {
        let mut state = self.lock();
        if state.alert_text.take().is_some() {
            Ok(())
        } else {
            Err(ContextError::new(
                ContextErrorKind::NoAlertPresent,
                "alert already closed",
            ))
        }
    }
}

impl Alert for FakeAlert {
    fn text(&self) -> ContextResult<String> {
        self.lock().alert_text.clone().ok_or_else(|| {
            ContextError::new(ContextErrorKind::NoAlertPresent, "alert already closed")
        })
    }

    fn accept(&self) -> ContextResult<()> {
        self.close()
    }

    fn dismiss(&self) -> ContextResult<()> {
        self.close()
    }
}
