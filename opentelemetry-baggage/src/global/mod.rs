//! Process-wide propagator.
//!
//! Instrumentation that injects or extracts baggage without being handed a
//! propagator uses the one installed here. Until [`set_text_map_propagator`]
//! is called it is a [`NoopTextMapPropagator`].
//!
//! ```
//! use opentelemetry_baggage::{global, propagation::NoopTextMapPropagator};
//! use std::collections::HashMap;
//!
//! global::set_text_map_propagator(NoopTextMapPropagator::new());
//!
//! let mut headers: HashMap<String, String> = HashMap::new();
//! global::get_text_map_propagator(|propagator| propagator.inject(&mut headers));
//! ```
mod internal_logging;

use crate::propagation::{NoopTextMapPropagator, TextMapPropagator};
use std::sync::{OnceLock, RwLock};

/// The current global `TextMapPropagator` propagator.
static GLOBAL_TEXT_MAP_PROPAGATOR: OnceLock<RwLock<Box<dyn TextMapPropagator + Send + Sync>>> =
    OnceLock::new();

/// Used when the global lock is poisoned.
static DEFAULT_TEXT_MAP_PROPAGATOR: OnceLock<NoopTextMapPropagator> = OnceLock::new();

#[inline]
fn global_text_map_propagator() -> &'static RwLock<Box<dyn TextMapPropagator + Send + Sync>> {
    GLOBAL_TEXT_MAP_PROPAGATOR.get_or_init(|| RwLock::new(Box::new(NoopTextMapPropagator::new())))
}

#[inline]
fn default_text_map_propagator() -> &'static NoopTextMapPropagator {
    DEFAULT_TEXT_MAP_PROPAGATOR.get_or_init(NoopTextMapPropagator::new)
}

/// Sets the given [`TextMapPropagator`] propagator as the current global propagator.
pub fn set_text_map_propagator<P: TextMapPropagator + Send + Sync + 'static>(propagator: P) {
    let _lock = global_text_map_propagator()
        .write()
        .map(|mut global_propagator| *global_propagator = Box::new(propagator));
}

/// Executes a closure with a reference to the current global [`TextMapPropagator`] propagator.
pub fn get_text_map_propagator<T, F>(mut f: F) -> T
where
    F: FnMut(&dyn TextMapPropagator) -> T,
{
    global_text_map_propagator()
        .read()
        .map(|propagator| f(&**propagator))
        .unwrap_or_else(|_| f(default_text_map_propagator() as &dyn TextMapPropagator))
}
