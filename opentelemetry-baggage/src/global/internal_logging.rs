//! Internal logging for baggage handling and the propagators built on it.
//!
//! With the `internal-logs` feature the events go to [`tracing`], targeted at
//! the calling crate. Under `cfg(test)` they are also printed to stdout, which
//! shows up with `--nocapture`. Without either, arguments are evaluated and
//! discarded.
//!
//! [`tracing`]: https://docs.rs/tracing

/// Emits one internal event at the given `tracing` level.
#[doc(hidden)]
#[macro_export]
macro_rules! __otel_event {
    ($level:ident, $name:expr $(, $key:ident = $value:expr)*) => {
        #[cfg(feature = "internal-logs")]
        {
            $crate::_private::$level!(
                name: $name,
                target: env!("CARGO_PKG_NAME"),
                name = $name
                $(, $key = $value)*
            );
        }

        #[cfg(test)]
        {
            print!("otel_{}: name={}", stringify!($level), $name);
            $(print!(", {}={}", stringify!($key), $value);)*
            println!();
        }

        #[cfg(all(not(feature = "internal-logs"), not(test)))]
        {
            let _ = ($name $(, $value)*);
        }
    };
}

/// Logs a warning, e.g. a configuration value that was ignored.
///
/// Takes an event `name` in `Component.Operation.Outcome` form followed by
/// optional `key = value` fields.
///
/// ```rust
/// use opentelemetry_baggage::otel_warn;
///
/// otel_warn!(name: "Propagators.Config.Unknown", propagator = "xray");
/// ```
#[macro_export]
macro_rules! otel_warn {
    (name: $name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::__otel_event!(warn, $name $(, $key = $value)*)
    };
}

/// Logs a debug event, e.g. a baggage update that had no effect.
///
/// ```rust
/// use opentelemetry_baggage::otel_debug;
///
/// otel_debug!(name: "Baggage.Set.Rejected", reason = "key is empty");
/// ```
#[macro_export]
macro_rules! otel_debug {
    (name: $name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::__otel_event!(debug, $name $(, $key = $value)*)
    };
}
