//! Propagator selection from the environment.
//!
//! `OTEL_PROPAGATORS` holds a comma separated, case-insensitive list of
//! propagator names:
//!
//! | Value     | Propagator            |
//! |-----------|-----------------------|
//! | `baggage` | [`BaggagePropagator`] |
//! | `none`    | nothing is propagated |
//!
//! When the variable is unset or empty `baggage` is used.
use crate::BaggagePropagator;
use opentelemetry_baggage::{
    otel_warn,
    propagation::{TextMapCompositePropagator, TextMapPropagator},
};
use std::env;

/// Environment variable naming the propagators to install.
pub const OTEL_PROPAGATORS: &str = "OTEL_PROPAGATORS";

const DEFAULT_PROPAGATORS: &str = "baggage";

/// Builds the propagators named by `OTEL_PROPAGATORS`, in the listed order.
///
/// Unknown names are logged and ignored, duplicates are installed once, and
/// `none` anywhere in the list yields an empty composite.
///
/// # Examples
///
/// ```
/// use opentelemetry_baggage::global;
/// use opentelemetry_baggage_propagator::config::propagator_from_env;
///
/// global::set_text_map_propagator(propagator_from_env());
/// ```
pub fn propagator_from_env() -> TextMapCompositePropagator {
    let value = env::var(OTEL_PROPAGATORS).unwrap_or_default();
    propagator_from_names(&value)
}

fn propagator_from_names(value: &str) -> TextMapCompositePropagator {
    let value = if value.trim().is_empty() {
        DEFAULT_PROPAGATORS
    } else {
        value
    };

    let mut names: Vec<String> = Vec::new();
    for name in value.split(',').map(|n| n.trim().to_lowercase()) {
        if name.is_empty() || names.contains(&name) {
            continue;
        }
        names.push(name);
    }

    if names.iter().any(|name| name == "none") {
        return TextMapCompositePropagator::new(Vec::new());
    }

    let propagators = names
        .iter()
        .filter_map(|name| -> Option<Box<dyn TextMapPropagator + Send + Sync>> {
            match name.as_str() {
                "baggage" => Some(Box::new(BaggagePropagator::new())),
                unknown => {
                    otel_warn!(
                        name: "Propagators.Config.Unknown",
                        propagator = unknown,
                        message = "Unsupported propagator in OTEL_PROPAGATORS, ignored"
                    );
                    None
                }
            }
        })
        .collect();
    TextMapCompositePropagator::new(propagators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry_baggage::baggage::{Baggage, BaggageExt};
    use opentelemetry_baggage::Context;
    use std::collections::HashMap;

    fn fields(propagator: &TextMapCompositePropagator) -> Vec<&str> {
        propagator.fields().collect()
    }

    #[test]
    fn unset_defaults_to_baggage() {
        temp_env::with_var_unset(OTEL_PROPAGATORS, || {
            let propagator = propagator_from_env();
            assert_eq!(propagator.len(), 1);
            assert_eq!(fields(&propagator), vec!["baggage"]);
        });
    }

    #[test]
    fn empty_defaults_to_baggage() {
        temp_env::with_var(OTEL_PROPAGATORS, Some("  "), || {
            assert_eq!(fields(&propagator_from_env()), vec!["baggage"]);
        });
    }

    #[test]
    fn names_are_case_insensitive_and_deduplicated() {
        temp_env::with_var(OTEL_PROPAGATORS, Some(" Baggage ,BAGGAGE"), || {
            let propagator = propagator_from_env();
            assert_eq!(propagator.len(), 1);

            let cx = Context::new().with_baggage(Baggage::new().set("k", "v"));
            let mut carrier: HashMap<String, String> = HashMap::new();
            propagator.inject_context(&cx, &mut carrier);
            assert_eq!(carrier.get("baggage"), Some(&"k=v".to_string()));
        });
    }

    #[test]
    fn none_disables_propagation() {
        temp_env::with_var(OTEL_PROPAGATORS, Some("baggage,none"), || {
            let propagator = propagator_from_env();
            assert!(propagator.is_empty());
            assert!(fields(&propagator).is_empty());
        });
    }

    #[test]
    fn unknown_names_are_ignored() {
        temp_env::with_var(OTEL_PROPAGATORS, Some("tracecontext,baggage,b3"), || {
            let propagator = propagator_from_env();
            assert_eq!(propagator.len(), 1);
            assert_eq!(fields(&propagator), vec!["baggage"]);
        });
        assert!(propagator_from_names("xray").is_empty());
    }
}
