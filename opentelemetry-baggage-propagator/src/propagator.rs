use opentelemetry_baggage::{
    baggage::{self, BaggageExt},
    otel_debug,
    propagation::{text_map_propagator::FieldIter, Extractor, Injector, TextMapPropagator},
    Context,
};

const BAGGAGE_HEADER: &str = "baggage";

/// Propagates name-value pairs in [W3C Baggage] format.
///
/// On injection the context's baggage is serialized into a single `baggage`
/// field; nothing is written when the baggage is empty. On extraction the
/// field is parsed and the resulting baggage replaces the one in the given
/// context. Members of the incoming header that are malformed or do not fit
/// the baggage limits are skipped, and one event per extraction logs how many.
///
/// # Examples
///
/// ```
/// use opentelemetry_baggage::{baggage::BaggageExt, propagation::TextMapPropagator};
/// use opentelemetry_baggage_propagator::BaggagePropagator;
/// use std::collections::HashMap;
///
/// // Example baggage value passed in externally via http headers
/// let mut headers = HashMap::new();
/// headers.insert("baggage".to_string(), "user_id=1".to_string());
///
/// let propagator = BaggagePropagator::new();
/// // can extract from any type that impls `Extractor`, usually an HTTP header map
/// let cx = propagator.extract(&headers);
///
/// // Add new baggage on top of what was received
/// let baggage = cx.baggage().set("server_id", "42");
/// let cx_with_additions = cx.with_baggage(baggage);
///
/// // Inject baggage into http request
/// propagator.inject_context(&cx_with_additions, &mut headers);
///
/// let header_value = headers.get("baggage").expect("header is injected");
/// assert_eq!(header_value, "server_id=42,user_id=1");
/// ```
///
/// [W3C Baggage]: https://w3c.github.io/baggage
#[derive(Debug)]
pub struct BaggagePropagator {
    fields: [String; 1],
}

impl Default for BaggagePropagator {
    fn default() -> Self {
        BaggagePropagator::builder().build()
    }
}

impl BaggagePropagator {
    /// Construct a new baggage propagator using the `baggage` field.
    pub fn new() -> Self {
        BaggagePropagator::default()
    }

    /// Configure a propagator, see [`BaggagePropagatorBuilder`].
    pub fn builder() -> BaggagePropagatorBuilder {
        BaggagePropagatorBuilder::default()
    }

    fn header_name(&self) -> &str {
        &self.fields[0]
    }
}

/// Builder for [`BaggagePropagator`].
#[derive(Debug, Default)]
pub struct BaggagePropagatorBuilder {
    header_name: Option<String>,
}

impl BaggagePropagatorBuilder {
    /// Read and write baggage under `name` instead of `baggage`, e.g. for RPC
    /// metadata carriers.
    ///
    /// Carrier lookups are usually case-insensitive; the name is stored in
    /// lowercase.
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = Some(name.into().to_lowercase());
        self
    }

    /// Build the propagator.
    pub fn build(self) -> BaggagePropagator {
        let name = self
            .header_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| BAGGAGE_HEADER.to_owned());
        BaggagePropagator { fields: [name] }
    }
}

impl TextMapPropagator for BaggagePropagator {
    /// Encodes the baggage of the `Context` and injects it into the provided `Injector`.
    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
        let baggage = cx.baggage();
        if !baggage.is_empty() {
            injector.set(self.header_name(), baggage::format(baggage));
        }
    }

    /// Extracts a `Context` with baggage values from an `Extractor`.
    fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
        let Some(header_value) = extractor.get(self.header_name()) else {
            return cx.clone();
        };

        let report = baggage::parse_with_report(&header_value);
        if let Some(first) = report.skipped.first() {
            otel_debug!(
                name: "BaggagePropagator.Extract.MembersSkipped",
                skipped = report.skipped_count,
                first_reason = first.to_string(),
            );
        }
        cx.with_baggage(report.baggage)
    }

    fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(&self.fields)
    }
}
