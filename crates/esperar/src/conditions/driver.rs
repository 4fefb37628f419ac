//! Page-level conditions: title, URL, frame availability and alerts.
//!
//! URL comparisons are case-insensitive, matching how browsers treat the
//! scheme and host portions in practice.

use regex::RegexBuilder;

use crate::context::{ContextErrorKind, Driver, FrameTarget};
use crate::result::{EsperarError, EsperarResult};
use crate::wait::{Condition, FnCondition};

/// The page title equals `title` exactly.
pub fn title_is<C: Driver>(title: impl Into<String>) -> impl Condition<C, Output = bool> {
    let title = title.into();
    let description = format!("page title to be {title:?}");
    FnCondition::new(
        move |context: &C| Ok((context.title()? == title).then_some(true)),
        description,
    )
}

/// The page title contains `fragment`.
pub fn title_contains<C: Driver>(fragment: impl Into<String>) -> impl Condition<C, Output = bool> {
    let fragment = fragment.into();
    let description = format!("page title to contain {fragment:?}");
    FnCondition::new(
        move |context: &C| Ok(context.title()?.contains(&fragment).then_some(true)),
        description,
    )
}

/// The page URL equals `url`, ignoring case.
pub fn url_to_be<C: Driver>(url: impl Into<String>) -> impl Condition<C, Output = bool> {
    let url = url.into();
    let description = format!("page url to be {url:?}");
    let expected = url.to_lowercase();
    FnCondition::new(
        move |context: &C| Ok((context.url()?.to_lowercase() == expected).then_some(true)),
        description,
    )
}

/// The page URL contains `fragment`, ignoring case.
pub fn url_contains<C: Driver>(fragment: impl Into<String>) -> impl Condition<C, Output = bool> {
    let fragment = fragment.into();
    let description = format!("page url to contain {fragment:?}");
    let expected = fragment.to_lowercase();
    FnCondition::new(
        move |context: &C| Ok(context.url()?.to_lowercase().contains(&expected).then_some(true)),
        description,
    )
}

/// The page URL matches the regular expression `pattern`, ignoring case.
///
/// The pattern is compiled once, here. An invalid pattern is a caller bug
/// and fails immediately rather than surfacing as a timeout.
///
/// # Errors
///
/// Returns [`EsperarError::Configuration`] when `pattern` is not a valid
/// regular expression.
pub fn url_matches<C: Driver>(
    pattern: &str,
) -> EsperarResult<impl Condition<C, Output = bool>> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| EsperarError::configuration(format!("invalid url pattern: {err}")))?;
    let description = format!("page url to match /{pattern}/");
    Ok(FnCondition::new(
        move |context: &C| Ok(regex.is_match(&context.url()?).then_some(true)),
        description,
    ))
}

/// The frame is available and the driver has switched into it.
///
/// The switch is the side effect; by the time the wait returns, the driver
/// is already inside the frame, so there is nothing further to yield.
pub fn frame_to_be_available_and_switch_to_it<C: Driver>(
    target: FrameTarget,
) -> impl Condition<C, Output = ()> {
    let description = format!("{target} to be available");
    FnCondition::new(
        move |context: &C| match context.switch_to_frame(&target) {
            Ok(()) => Ok(Some(())),
            Err(err) if err.is(ContextErrorKind::NoSuchFrame) => Ok(None),
            Err(err) => Err(err),
        },
        description,
    )
}

/// An alert is open; yields the alert handle.
pub fn alert_is_present<C: Driver>() -> impl Condition<C, Output = C::Alert> {
    FnCondition::new(
        |context: &C| match context.switch_to_alert() {
            Ok(alert) => Ok(Some(alert)),
            Err(err) if err.is(ContextErrorKind::NoAlertPresent) => Ok(None),
            Err(err) => Err(err),
        },
        "an alert to be present",
    )
}

/// The presence of an alert equals `expected`: waiting either for one to
/// open or for the page to have none.
pub fn alert_state<C: Driver>(expected: bool) -> impl Condition<C, Output = bool> {
    let description = if expected {
        "an alert to be present"
    } else {
        "no alert to be present"
    };
    FnCondition::new(
        move |context: &C| {
            let present = match context.switch_to_alert() {
                Ok(_) => true,
                Err(err) if err.is(ContextErrorKind::NoAlertPresent) => false,
                Err(err) => return Err(err),
            };
            Ok((present == expected).then_some(true))
        },
        description,
    )
}
