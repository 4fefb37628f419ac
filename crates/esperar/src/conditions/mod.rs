//! Ready-made expected conditions.
//!
//! Factories come in two flavors: [`search_context`] conditions work against
//! any [`crate::context::SearchContext`] (the root driver or an
//! element-scoped sub-context), while [`driver`] conditions need the
//! page-level [`crate::context::Driver`] capability (title, URL, frame and
//! alert switching). Every factory returns a [`crate::wait::FnCondition`]
//! closed over its parameters, ready to hand to the wait engine.

pub mod driver;
pub mod search_context;

pub use driver::*;
pub use search_context::*;
