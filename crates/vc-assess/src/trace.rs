use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

static ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_hex_id() -> String {
    format!("{:016x}", ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Distributed-trace context threaded through a claim issue → assess →
/// archive chain. Callers at the edge of the pipeline (an HTTP handler, a
/// CLI invocation) construct a root context and hand it down; the
/// composite assessor mints one child span per concurrent assessor so each
/// `IndividualAssessorResult` carries its own `span_id` under a shared
/// `trace_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
    pub baggage: BTreeMap<String, String>,
}

impl TraceContext {
    /// Start a fresh trace with no parent.
    pub fn root() -> Self {
        Self { trace_id: next_hex_id(), span_id: next_hex_id(), baggage: BTreeMap::new() }
    }

    /// A child span under the same trace, carrying the same baggage.
    pub fn child_span(&self) -> Self {
        Self { trace_id: self.trace_id.clone(), span_id: next_hex_id(), baggage: self.baggage.clone() }
    }

    pub fn with_baggage(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.baggage.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_span_preserves_trace_id_but_not_span_id() {
        let root = TraceContext::root();
        let child = root.child_span();
        assert_eq!(root.trace_id, child.trace_id);
        assert_ne!(root.span_id, child.span_id);
    }

    #[test]
    fn baggage_propagates_to_children() {
        let root = TraceContext::root().with_baggage("tenant", "acme");
        let child = root.child_span();
        assert_eq!(child.baggage.get("tenant"), Some(&"acme".to_string()));
    }
}
