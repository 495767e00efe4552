//! A propagator that does nothing, selected by `OTEL_PROPAGATORS=none` and
//! installed globally until another propagator is set.
use crate::propagation::{text_map_propagator::FieldIter, Extractor, Injector, TextMapPropagator};
use crate::Context;

/// Injects nothing and extracts the context it is given.
#[derive(Debug, Default)]
pub struct NoopTextMapPropagator {
    _private: (),
}

impl NoopTextMapPropagator {
    /// Create a new noop text map propagator.
    pub fn new() -> Self {
        NoopTextMapPropagator { _private: () }
    }
}

impl TextMapPropagator for NoopTextMapPropagator {
    fn inject_context(&self, _cx: &Context, _injector: &mut dyn Injector) {}

    fn extract_with_context(&self, cx: &Context, _extractor: &dyn Extractor) -> Context {
        cx.clone()
    }

    fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baggage::{Baggage, BaggageExt};
    use std::collections::HashMap;

    #[test]
    fn noop_injects_nothing_and_keeps_context() {
        let propagator = NoopTextMapPropagator::new();
        let cx = Context::new().with_baggage(Baggage::new().set("k", "v"));

        let mut carrier: HashMap<String, String> = HashMap::new();
        propagator.inject_context(&cx, &mut carrier);
        assert!(carrier.is_empty());

        carrier.insert("baggage".to_string(), "other=1".to_string());
        let extracted = propagator.extract_with_context(&cx, &carrier);
        assert_eq!(extracted.baggage().to_header(), "k=v");
        assert_eq!(propagator.fields().count(), 0);
    }
}
