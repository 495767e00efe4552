//! # Composite Propagator
//!
//! Groups several [`TextMapPropagator`]s so that they are used as one.
use crate::{
    propagation::{text_map_propagator::FieldIter, Extractor, Injector, TextMapPropagator},
    Context,
};
use std::collections::HashSet;

/// Composite propagator for [`TextMapPropagator`]s.
///
/// Injection and extraction run the inner propagators in the order they
/// were given; each extraction starts from the context produced by the
/// previous one.
///
/// # Examples
///
/// ```
/// use opentelemetry_baggage::{
///     baggage::{Baggage, BaggageExt},
///     propagation::{NoopTextMapPropagator, TextMapCompositePropagator, TextMapPropagator},
///     Context,
/// };
/// use std::collections::HashMap;
///
/// let composite = TextMapCompositePropagator::new(vec![Box::new(NoopTextMapPropagator::new())]);
///
/// let cx = Context::new().with_baggage(Baggage::new().set("k", "v"));
/// let mut carrier: HashMap<String, String> = HashMap::new();
/// composite.inject_context(&cx, &mut carrier);
///
/// assert!(carrier.is_empty());
/// ```
#[derive(Debug)]
pub struct TextMapCompositePropagator {
    propagators: Vec<Box<dyn TextMapPropagator + Send + Sync>>,
    fields: Vec<String>,
}

impl TextMapCompositePropagator {
    /// Constructs a new propagator out of instances of [`TextMapPropagator`].
    pub fn new(propagators: Vec<Box<dyn TextMapPropagator + Send + Sync>>) -> Self {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for field in propagators.iter().flat_map(|p| p.fields()) {
            if seen.insert(field) {
                fields.push(field.to_string());
            }
        }

        TextMapCompositePropagator {
            propagators,
            fields,
        }
    }

    /// Number of inner propagators.
    pub fn len(&self) -> usize {
        self.propagators.len()
    }

    /// Returns `true` if there are no inner propagators.
    pub fn is_empty(&self) -> bool {
        self.propagators.is_empty()
    }
}

impl TextMapPropagator for TextMapCompositePropagator {
    fn inject_context(&self, context: &Context, injector: &mut dyn Injector) {
        for propagator in &self.propagators {
            propagator.inject_context(context, injector)
        }
    }

    fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
        self.propagators
            .iter()
            .fold(cx.clone(), |current_cx, propagator| {
                propagator.extract_with_context(&current_cx, extractor)
            })
    }

    fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(self.fields.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baggage::{Baggage, BaggageExt};
    use std::collections::HashMap;

    /// Injects and extracts the whole baggage under a single header.
    #[derive(Debug)]
    struct TestPropagator {
        fields: Vec<String>,
    }

    impl TestPropagator {
        fn new(header: &'static str) -> Self {
            TestPropagator {
                fields: vec![header.to_string()],
            }
        }
    }

    impl TextMapPropagator for TestPropagator {
        fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
            injector.set(&self.fields[0], cx.baggage().to_header());
        }

        fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
            match extractor.get(&self.fields[0]) {
                Some(header) => {
                    // merge into what earlier propagators extracted
                    let mut baggage = cx.baggage().clone();
                    for entry in &Baggage::from_header(&header) {
                        baggage = baggage.set(entry.key().clone(), entry.value().clone());
                    }
                    cx.with_baggage(baggage)
                }
                None => cx.clone(),
            }
        }

        fn fields(&self) -> FieldIter<'_> {
            FieldIter::new(self.fields.as_slice())
        }
    }

    fn composite() -> TextMapCompositePropagator {
        TextMapCompositePropagator::new(vec![
            Box::new(TestPropagator::new("first")),
            Box::new(TestPropagator::new("second")),
            Box::new(TestPropagator::new("first")),
        ])
    }

    #[test]
    fn fields_are_deduplicated_in_order() {
        let composite = composite();
        let fields: Vec<_> = composite.fields().collect();
        assert_eq!(fields, vec!["first", "second"]);
        assert_eq!(composite.len(), 3);
    }

    #[test]
    fn inject_runs_every_propagator() {
        let cx = Context::new().with_baggage(Baggage::new().set("k", "v"));
        let mut carrier: HashMap<String, String> = HashMap::new();
        composite().inject_context(&cx, &mut carrier);

        assert_eq!(carrier.get("first"), Some(&"k=v".to_string()));
        assert_eq!(carrier.get("second"), Some(&"k=v".to_string()));
    }

    #[test]
    fn extract_chains_contexts() {
        let mut carrier: HashMap<String, String> = HashMap::new();
        carrier.insert("first".to_string(), "a=1".to_string());
        carrier.insert("second".to_string(), "b=2".to_string());

        let cx = composite().extract_with_context(&Context::new(), &carrier);
        assert_eq!(cx.baggage().get("a").map(|v| v.as_str()), Some("1"));
        assert_eq!(cx.baggage().get("b").map(|v| v.as_str()), Some("2"));
    }

    #[test]
    fn empty_composite_keeps_context() {
        let empty = TextMapCompositePropagator::new(Vec::new());
        assert!(empty.is_empty());

        let cx = Context::new().with_baggage(Baggage::new().set("k", "v"));
        let extracted = empty.extract_with_context(&cx, &HashMap::<String, String>::new());
        assert!(extracted.has_baggage());
        assert_eq!(empty.fields().count(), 0);
    }
}
