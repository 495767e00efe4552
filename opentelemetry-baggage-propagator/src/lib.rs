//! The [W3C Baggage] text map propagator.
//!
//! [`BaggagePropagator`] moves the [`Baggage`] of a [`Context`] through any
//! carrier implementing [`Injector`] and [`Extractor`], such as a map of HTTP
//! headers. [`config::propagator_from_env`] builds the propagators selected by
//! `OTEL_PROPAGATORS`.
//!
//! ```
//! use opentelemetry_baggage::{
//!     baggage::{Baggage, BaggageExt},
//!     propagation::TextMapPropagator,
//!     Context,
//! };
//! use opentelemetry_baggage_propagator::BaggagePropagator;
//! use std::collections::HashMap;
//!
//! let propagator = BaggagePropagator::new();
//!
//! // client side
//! let cx = Context::new().with_baggage(Baggage::new().set("k1", "v1").set("k2", "v2"));
//! let mut headers: HashMap<String, String> = HashMap::new();
//! propagator.inject_context(&cx, &mut headers);
//!
//! // server side
//! let received = propagator.extract(&headers);
//! assert_eq!(received.baggage(), cx.baggage());
//! ```
//!
//! [W3C Baggage]: https://w3c.github.io/baggage
//! [`Baggage`]: opentelemetry_baggage::baggage::Baggage
//! [`Context`]: opentelemetry_baggage::Context
//! [`Injector`]: opentelemetry_baggage::propagation::Injector
//! [`Extractor`]: opentelemetry_baggage::propagation::Extractor
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]

pub mod config;
mod propagator;

pub use propagator::{BaggagePropagator, BaggagePropagatorBuilder};
