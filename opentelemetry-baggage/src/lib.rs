//! W3C [Baggage] for Rust: an immutable, bounded container of name/value
//! pairs and the codec for its `baggage` header.
//!
//! [Baggage]: https://w3c.github.io/baggage
//!
//! # Overview
//!
//! Baggage carries user-defined properties, such as a tenant or a feature
//! flag, alongside a request and across process boundaries. This crate
//! contains:
//!
//! - **[`baggage`]:** the [`Baggage`](baggage::Baggage) container, its limits
//!   and conversion to and from a header value. Every operation is total:
//!   invalid input yields a well-defined container instead of an error.
//! - **[`Context`]:** an execution-scoped, immutable map from which the
//!   current baggage is read.
//! - **[`propagation`]:** the [`TextMapPropagator`] interface with the
//!   [`Injector`] and [`Extractor`] carrier traits, plus composite and noop
//!   propagators.
//! - **[`global`]:** a process-wide propagator.
//!
//! The `baggage` header propagator itself lives in the
//! `opentelemetry-baggage-propagator` crate.
//!
//! [`TextMapPropagator`]: propagation::TextMapPropagator
//! [`Injector`]: propagation::Injector
//! [`Extractor`]: propagation::Extractor
//!
//! # Getting started
//!
//! ```
//! use opentelemetry_baggage::{baggage::Baggage, StringValue};
//!
//! let baggage = Baggage::from_header("userId=alice,serverNode=DF%2028;ttl=30")
//!     .set("isProduction", "false");
//!
//! assert_eq!(baggage.get("serverNode"), Some(&StringValue::from("DF 28")));
//! assert_eq!(
//!     baggage.to_header(),
//!     "isProduction=false,userId=alice,serverNode=DF+28;ttl=30"
//! );
//! ```
//!
//! # Crate Feature Flags
//!
//! * `internal-logs`: emits internal diagnostics, such as rejected updates and
//!   skipped header members, as [`tracing`](https://docs.rs/tracing) events.
//!   Enabled by default.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![allow(clippy::needless_doctest_main)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]

pub mod global;

pub mod baggage;

mod context;

pub use context::{Context, ContextGuard};

mod common;

pub use common::{Key, StringValue};

pub mod propagation;

#[cfg(feature = "internal-logs")]
#[doc(hidden)]
pub mod _private {
    pub use tracing::{debug, warn};
}
