//! Conditions over any search context: presence, visibility, text, class
//! membership, staleness and selection state.
//!
//! Error policy follows the classic expected-conditions contract: a
//! condition absorbs only the error kinds for which "not there yet" is the
//! expected steady state, and lets everything else propagate so the engine
//! can classify it. The invisibility conditions invert this: for them a
//! lookup failure or stale reference IS the success signal.

use std::sync::OnceLock;

use regex::Regex;

use crate::context::{ContextErrorKind, Element, SearchContext};
use crate::locator::Locator;
use crate::wait::{Condition, FnCondition};

/// Class attribute tokenizer: word characters and hyphens.
fn class_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[_a-zA-Z0-9-]+").expect("valid class token pattern"))
}

/// Exact-token membership: `"btn"` does not match inside `"btn-primary"`.
fn has_class_token(attribute: &str, class_name: &str) -> bool {
    class_token_regex()
        .find_iter(attribute)
        .any(|token| token.as_str() == class_name)
}

/// The element is present on the DOM, not necessarily visible.
///
/// Lookup failure propagates out of the condition; the engine's built-in
/// `NotFound` tolerance is what drives the retry.
pub fn element_exists<C: SearchContext>(
    locator: Locator,
) -> impl Condition<C, Output = C::Element> {
    let description = format!("element {locator} to exist");
    FnCondition::new(
        move |context: &C| context.find_element(&locator).map(Some),
        description,
    )
}

/// The element is present and displayed with a positive size.
pub fn element_is_visible<C: SearchContext>(
    locator: Locator,
) -> impl Condition<C, Output = C::Element> {
    let description = format!("element {locator} to be visible");
    FnCondition::new(
        move |context: &C| {
            let element = match context.find_element(&locator) {
                Ok(element) => element,
                Err(err) if err.is(ContextErrorKind::StaleReference) => return Ok(None),
                Err(err) => return Err(err),
            };
            match element.is_displayed() {
                Ok(true) => Ok(Some(element)),
                Ok(false) => Ok(None),
                Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(None),
                Err(err) => Err(err),
            }
        },
        description,
    )
}

/// All elements matching the locator exist (at least one) and are displayed.
pub fn visibility_of_all_elements_located<C: SearchContext>(
    locator: Locator,
) -> impl Condition<C, Output = Vec<C::Element>> {
    let description = format!("all elements {locator} to be visible");
    FnCondition::new(
        move |context: &C| {
            let elements = match context.find_elements(&locator) {
                Ok(elements) => elements,
                Err(err) if err.is(ContextErrorKind::StaleReference) => return Ok(None),
                Err(err) => return Err(err),
            };
            all_displayed(elements)
        },
        description,
    )
}

/// All of the given elements are displayed (and the set is non-empty).
pub fn visibility_of_all_elements<C, E: Element>(
    elements: Vec<E>,
) -> impl Condition<C, Output = Vec<E>> {
    FnCondition::new(
        move |_: &C| all_displayed(elements.clone()),
        "all captured elements to be visible",
    )
}

fn all_displayed<E: Element>(
    elements: Vec<E>,
) -> Result<Option<Vec<E>>, crate::context::ContextError> {
    if elements.is_empty() {
        return Ok(None);
    }
    for element in &elements {
        match element.is_displayed() {
            Ok(true) => {}
            Ok(false) => return Ok(None),
            Err(err) if err.is(ContextErrorKind::StaleReference) => return Ok(None),
            Err(err) => return Err(err),
        }
    }
    Ok(Some(elements))
}

/// At least one element matching the locator is present.
pub fn presence_of_all_elements_located<C: SearchContext>(
    locator: Locator,
) -> impl Condition<C, Output = Vec<C::Element>> {
    let description = format!("elements {locator} to be present");
    FnCondition::new(
        move |context: &C| match context.find_elements(&locator) {
            Ok(elements) if elements.is_empty() => Ok(None),
            Ok(elements) => Ok(Some(elements)),
            Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(None),
            Err(err) => Err(err),
        },
        description,
    )
}

/// The captured element's text contains `text`.
pub fn text_to_be_present_in_element<C, E: Element>(
    element: E,
    text: impl Into<String>,
) -> impl Condition<C, Output = bool> {
    let text = text.into();
    let description = format!("captured element text to contain {text:?}");
    FnCondition::new(
        move |_: &C| match element.text() {
            Ok(actual) if actual.contains(&text) => Ok(Some(true)),
            Ok(_) => Ok(None),
            Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(None),
            Err(err) => Err(err),
        },
        description,
    )
}

/// The text of the element matching the locator contains `text`.
pub fn text_to_be_present_in_element_located<C: SearchContext>(
    locator: Locator,
    text: impl Into<String>,
) -> impl Condition<C, Output = bool> {
    let text = text.into();
    let description = format!("element {locator} text to contain {text:?}");
    FnCondition::new(
        move |context: &C| {
            let element = match context.find_element(&locator) {
                Ok(element) => element,
                Err(err) if err.is(ContextErrorKind::StaleReference) => return Ok(None),
                Err(err) => return Err(err),
            };
            match element.text() {
                Ok(actual) if actual.contains(&text) => Ok(Some(true)),
                Ok(_) => Ok(None),
                Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(None),
                Err(err) => Err(err),
            }
        },
        description,
    )
}

/// The captured element's `value` attribute contains `text`; an absent
/// attribute is "not yet".
pub fn text_to_be_present_in_element_value<C, E: Element>(
    element: E,
    text: impl Into<String>,
) -> impl Condition<C, Output = bool> {
    let text = text.into();
    let description = format!("captured element value to contain {text:?}");
    FnCondition::new(
        move |_: &C| value_contains(&element, &text),
        description,
    )
}

/// The `value` attribute of the element matching the locator contains
/// `text`; an absent attribute is "not yet".
pub fn text_to_be_present_in_element_value_located<C: SearchContext>(
    locator: Locator,
    text: impl Into<String>,
) -> impl Condition<C, Output = bool> {
    let text = text.into();
    let description = format!("element {locator} value to contain {text:?}");
    FnCondition::new(
        move |context: &C| {
            let element = match context.find_element(&locator) {
                Ok(element) => element,
                Err(err) if err.is(ContextErrorKind::StaleReference) => return Ok(None),
                Err(err) => return Err(err),
            };
            value_contains(&element, &text)
        },
        description,
    )
}

fn value_contains<E: Element>(
    element: &E,
    text: &str,
) -> Result<Option<bool>, crate::context::ContextError> {
    match element.attribute("value") {
        Ok(Some(value)) if value.contains(text) => Ok(Some(true)),
        Ok(_) => Ok(None),
        Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(None),
        Err(err) => Err(err),
    }
}

/// The element is either invisible or absent from the DOM.
///
/// Lookup failure and stale references are the success signal here, not a
/// retry state: absence implies invisibility.
pub fn invisibility_of_element_located<C: SearchContext>(
    locator: Locator,
) -> impl Condition<C, Output = bool> {
    let description = format!("element {locator} to be invisible or absent");
    FnCondition::new(
        move |context: &C| {
            let element = match context.find_element(&locator) {
                Ok(element) => element,
                Err(err) if absence(&err) => return Ok(Some(true)),
                Err(err) => return Err(err),
            };
            match element.is_displayed() {
                Ok(true) => Ok(None),
                Ok(false) => Ok(Some(true)),
                Err(err) if absence(&err) => Ok(Some(true)),
                Err(err) => Err(err),
            }
        },
        description,
    )
}

/// The element with the given text is invisible or absent: success when the
/// text is empty, differs from `text`, or the element cannot be read at all.
pub fn invisibility_of_element_with_text<C: SearchContext>(
    locator: Locator,
    text: impl Into<String>,
) -> impl Condition<C, Output = bool> {
    let text = text.into();
    let description = format!("element {locator} with text {text:?} to be invisible or absent");
    FnCondition::new(
        move |context: &C| {
            let element = match context.find_element(&locator) {
                Ok(element) => element,
                Err(err) if absence(&err) => return Ok(Some(true)),
                Err(err) => return Err(err),
            };
            match element.text() {
                Ok(actual) if actual.is_empty() => Ok(Some(true)),
                Ok(actual) if actual != text => Ok(Some(true)),
                Ok(_) => Ok(None),
                Err(err) if absence(&err) => Ok(Some(true)),
                Err(err) => Err(err),
            }
        },
        description,
    )
}

/// `NotFound` and `StaleReference` both mean "the element is gone".
fn absence(err: &crate::context::ContextError) -> bool {
    err.is(ContextErrorKind::NotFound) || err.is(ContextErrorKind::StaleReference)
}

/// The element is visible and enabled such that you can click it.
pub fn element_to_be_clickable<C: SearchContext>(
    locator: Locator,
) -> impl Condition<C, Output = C::Element> {
    let description = format!("element {locator} to be clickable");
    FnCondition::new(
        move |context: &C| {
            let element = context.find_element(&locator)?;
            clickable_state(element)
        },
        description,
    )
}

/// The captured element is visible and enabled such that you can click it.
pub fn element_to_be_clickable_element<C, E: Element>(
    element: E,
) -> impl Condition<C, Output = E> {
    FnCondition::new(
        move |_: &C| clickable_state(element.clone()),
        "captured element to be clickable",
    )
}

fn clickable_state<E: Element>(
    element: E,
) -> Result<Option<E>, crate::context::ContextError> {
    let ready = element
        .is_displayed()
        .and_then(|displayed| Ok(displayed && element.is_enabled()?));
    match ready {
        Ok(true) => Ok(Some(element)),
        Ok(false) => Ok(None),
        Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(None),
        Err(err) => Err(err),
    }
}

/// The element is no longer attached to the DOM.
///
/// Any read forces a staleness check: a stale-reference error maps to
/// success, as does the element reporting itself disabled.
pub fn staleness_of<C, E: Element>(element: E) -> impl Condition<C, Output = bool> {
    FnCondition::new(
        move |_: &C| match element.is_enabled() {
            Ok(true) => Ok(None),
            Ok(false) => Ok(Some(true)),
            Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(Some(true)),
            Err(err) => Err(err),
        },
        "captured element to become stale",
    )
}

/// The captured element is selected.
pub fn element_to_be_selected<C, E: Element>(element: E) -> impl Condition<C, Output = bool> {
    element_selection_state_to_be(element, true)
}

/// The captured element's selection state equals `selected`.
///
/// Reads are not guarded: a stale element handle propagates.
pub fn element_selection_state_to_be<C, E: Element>(
    element: E,
    selected: bool,
) -> impl Condition<C, Output = bool> {
    let description = format!("captured element selection state to be {selected}");
    FnCondition::new(
        move |_: &C| {
            let actual = element.is_selected()?;
            Ok(if actual == selected { Some(true) } else { None })
        },
        description,
    )
}

/// The element matching the locator is selected.
pub fn element_to_be_selected_located<C: SearchContext>(
    locator: Locator,
) -> impl Condition<C, Output = bool> {
    element_selection_state_to_be_located(locator, true)
}

/// The selection state of the element matching the locator equals
/// `selected`; stale references during the read are "not yet".
pub fn element_selection_state_to_be_located<C: SearchContext>(
    locator: Locator,
    selected: bool,
) -> impl Condition<C, Output = bool> {
    let description = format!("element {locator} selection state to be {selected}");
    FnCondition::new(
        move |context: &C| {
            let element = match context.find_element(&locator) {
                Ok(element) => element,
                Err(err) if err.is(ContextErrorKind::StaleReference) => return Ok(None),
                Err(err) => return Err(err),
            };
            match element.is_selected() {
                Ok(actual) if actual == selected => Ok(Some(true)),
                Ok(_) => Ok(None),
                Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(None),
                Err(err) => Err(err),
            }
        },
        description,
    )
}

/// The element matching the locator carries `class_name` as an exact class
/// token. An absent `class` attribute is an empty token set.
pub fn element_contains_class<C: SearchContext>(
    locator: Locator,
    class_name: impl Into<String>,
) -> impl Condition<C, Output = C::Element> {
    let class_name = class_name.into();
    let description = format!("element {locator} to have class {class_name:?}");
    FnCondition::new(
        move |context: &C| {
            let element = context.find_element(&locator)?;
            let attribute = element.attribute("class")?.unwrap_or_default();
            Ok(if has_class_token(&attribute, &class_name) {
                Some(element)
            } else {
                None
            })
        },
        description,
    )
}

/// The captured element carries `class_name` as an exact class token.
pub fn element_contains_class_element<C, E: Element>(
    element: E,
    class_name: impl Into<String>,
) -> impl Condition<C, Output = E> {
    let class_name = class_name.into();
    let description = format!("captured element to have class {class_name:?}");
    FnCondition::new(
        move |_: &C| match element.attribute("class") {
            Ok(attribute) => {
                let attribute = attribute.unwrap_or_default();
                Ok(if has_class_token(&attribute, &class_name) {
                    Some(element.clone())
                } else {
                    None
                })
            }
            Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(None),
            Err(err) => Err(err),
        },
        description,
    )
}

/// No class token of the element matching the locator equals `class_name`.
pub fn element_not_contains_class<C: SearchContext>(
    locator: Locator,
    class_name: impl Into<String>,
) -> impl Condition<C, Output = C::Element> {
    let class_name = class_name.into();
    let description = format!("element {locator} to not have class {class_name:?}");
    FnCondition::new(
        move |context: &C| {
            let element = context.find_element(&locator)?;
            let attribute = element.attribute("class")?.unwrap_or_default();
            Ok(if has_class_token(&attribute, &class_name) {
                None
            } else {
                Some(element)
            })
        },
        description,
    )
}

/// No class token of the captured element equals `class_name`.
pub fn element_not_contains_class_element<C, E: Element>(
    element: E,
    class_name: impl Into<String>,
) -> impl Condition<C, Output = E> {
    let class_name = class_name.into();
    let description = format!("captured element to not have class {class_name:?}");
    FnCondition::new(
        move |_: &C| match element.attribute("class") {
            Ok(attribute) => {
                let attribute = attribute.unwrap_or_default();
                Ok(if has_class_token(&attribute, &class_name) {
                    None
                } else {
                    Some(element.clone())
                })
            }
            Err(err) if err.is(ContextErrorKind::StaleReference) => Ok(None),
            Err(err) => Err(err),
        },
        description,
    )
}
