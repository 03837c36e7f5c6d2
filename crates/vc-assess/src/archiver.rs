use std::sync::Arc;

use vc_core::TimeProvider;

use crate::composite::{AggregatedAssessmentResult, IndividualAssessorResult};
use crate::trace::TraceContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStatus {
    Archived,
    Skipped,
    Failed,
}

/// Delegate that actually persists a result payload (database row, object
/// store, log sink...). The archiver never inspects what the delegate does
/// with the bytes, only whether it reports success.
pub type ArchiveFn = Arc<dyn Fn(&str, &[u8]) -> ArchiveStatus + Send + Sync>;

/// Wraps an archive delegate with the bookkeeping every archive call
/// shares: a trace/span, a timestamp from the injected clock, and a
/// uniform status return. Never interprets the payload it is handed.
pub struct Archiver {
    delegate: ArchiveFn,
    time: Arc<dyn TimeProvider>,
}

impl Archiver {
    pub fn new(delegate: ArchiveFn, time: Arc<dyn TimeProvider>) -> Self {
        Self { delegate, time }
    }

    /// Archive one opaque payload under `key`, returning the delegate's
    /// status. `_trace` is accepted for symmetry with `archive_aggregated`
    /// and so a future delegate signature can take it without breaking
    /// this call site.
    pub fn archive(&self, key: &str, payload: &[u8], _trace: &TraceContext) -> (ArchiveStatus, i64) {
        let status = (self.delegate)(key, payload);
        (status, self.time.utc_now())
    }

    /// Archive each completed individual result from an aggregated
    /// assessment separately, preserving iteration order in the returned
    /// list. Results that never completed (cancelled/timed-out/faulted)
    /// carry nothing worth archiving and are skipped.
    pub fn archive_aggregated(
        &self,
        aggregated: &AggregatedAssessmentResult,
        payload_for: impl Fn(&IndividualAssessorResult) -> Vec<u8>,
        trace: &TraceContext,
    ) -> Vec<(String, ArchiveStatus, i64)> {
        aggregated
            .individual
            .iter()
            .map(|individual| {
                if individual.result.is_none() {
                    (individual.assessor_id.clone(), ArchiveStatus::Skipped, self.time.utc_now())
                } else {
                    let payload = payload_for(individual);
                    let (status, at) = self.archive(&individual.assessor_id, &payload, trace);
                    (individual.assessor_id.clone(), status, at)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::AssessorStatus;
    use crate::simple::AssessmentResult;
    use parking_lot::Mutex;
    use std::time::Duration;
    use vc_core::FixedTimeProvider;

    fn archiver_recording(calls: Arc<Mutex<Vec<String>>>) -> Archiver {
        let delegate: ArchiveFn = Arc::new(move |key, _payload| {
            calls.lock().push(key.to_string());
            ArchiveStatus::Archived
        });
        Archiver::new(delegate, Arc::new(FixedTimeProvider(42)))
    }

    #[test]
    fn archive_returns_delegate_status_and_injected_timestamp() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let archiver = archiver_recording(Arc::clone(&calls));
        let (status, at) = archiver.archive("key-1", b"payload", &TraceContext::root());
        assert_eq!(status, ArchiveStatus::Archived);
        assert_eq!(at, 42);
        assert_eq!(calls.lock().as_slice(), ["key-1"]);
    }

    #[test]
    fn aggregated_archive_preserves_order_and_skips_incomplete_results() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let archiver = archiver_recording(Arc::clone(&calls));

        let completed = |id: &str| IndividualAssessorResult {
            assessor_id: id.to_string(),
            status: AssessorStatus::Completed,
            result: Some(AssessmentResult {
                id: "r".into(),
                assessor_id: id.to_string(),
                source_claim_result_id: "c".into(),
                success: true,
                failed_claims: Vec::new(),
                assessed_at: 0,
                trace_id: "t".into(),
                span_id: "s".into(),
            }),
            error: None,
            duration: Duration::ZERO,
            span_id: "s".into(),
        };
        let cancelled = IndividualAssessorResult {
            assessor_id: "cancelled-one".into(),
            status: AssessorStatus::Cancelled,
            result: None,
            error: None,
            duration: Duration::ZERO,
            span_id: "s".into(),
        };

        let aggregated = AggregatedAssessmentResult {
            id: "agg".into(),
            source_claim_result_id: "c".into(),
            individual: vec![completed("first"), cancelled, completed("third")],
            is_success: true,
            assessed_at: 0,
            trace_id: "t".into(),
        };

        let outcomes = archiver.archive_aggregated(&aggregated, |_| Vec::new(), &TraceContext::root());
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].0, "first");
        assert_eq!(outcomes[0].1, ArchiveStatus::Archived);
        assert_eq!(outcomes[1].0, "cancelled-one");
        assert_eq!(outcomes[1].1, ArchiveStatus::Skipped);
        assert_eq!(outcomes[2].0, "third");
        assert_eq!(outcomes[2].1, ArchiveStatus::Archived);

        assert_eq!(calls.lock().as_slice(), ["first", "third"]);
    }
}
