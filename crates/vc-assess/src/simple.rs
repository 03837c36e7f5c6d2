use std::sync::Arc;

use vc_core::TimeProvider;

use crate::claim::ClaimOutcome;
use crate::id::ResultIdGenerator;
use crate::issuer::{ClaimIssueResult, CompletionStatus};
use crate::trace::TraceContext;

/// Outcome of a `SimpleAssessor` pass over one `ClaimIssueResult`.
#[derive(Debug, Clone)]
pub struct AssessmentResult {
    pub id: String,
    pub assessor_id: String,
    pub source_claim_result_id: String,
    pub success: bool,
    pub failed_claims: Vec<String>,
    pub assessed_at: i64,
    pub trace_id: String,
    pub span_id: String,
}

/// The simplest assessor: succeeds iff the claim-issue run completed (was
/// not cancelled) and every claim it carries succeeded. An incomplete run
/// is never treated as a success, even if every claim issued so far passed
/// — a rule that never got to run might have failed.
pub struct SimpleAssessor {
    assessor_id: String,
    id_gen: Arc<dyn ResultIdGenerator>,
    time: Arc<dyn TimeProvider>,
}

impl SimpleAssessor {
    pub fn new(
        assessor_id: impl Into<String>,
        id_gen: Arc<dyn ResultIdGenerator>,
        time: Arc<dyn TimeProvider>,
    ) -> Self {
        Self { assessor_id: assessor_id.into(), id_gen, time }
    }

    pub fn assess(&self, claims: &ClaimIssueResult, trace: &TraceContext) -> AssessmentResult {
        let failed_claims: Vec<String> = claims
            .claims
            .iter()
            .filter(|c| c.outcome == ClaimOutcome::Failure)
            .map(|c| c.name.clone())
            .collect();
        let success = claims.completion_status == CompletionStatus::Complete && failed_claims.is_empty();

        AssessmentResult {
            id: self.id_gen.next_id(),
            assessor_id: self.assessor_id.clone(),
            source_claim_result_id: claims.id.clone(),
            success,
            failed_claims,
            assessed_at: self.time.utc_now(),
            trace_id: trace.trace_id.clone(),
            span_id: trace.span_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Claim;
    use crate::id::FixedIdGenerator;
    use std::collections::BTreeMap;
    use vc_core::FixedTimeProvider;

    fn base_result(status: CompletionStatus, claims: Vec<Claim>) -> ClaimIssueResult {
        ClaimIssueResult {
            id: "c-1".into(),
            issuer_id: "issuer".into(),
            correlation_id: "corr".into(),
            total_rules: claims.len() as u32,
            rules_executed: claims.len() as u32,
            claims,
            created_at: 0,
            completion_status: status,
            trace_id: "t".into(),
            span_id: "s".into(),
            baggage: BTreeMap::new(),
        }
    }

    fn assessor() -> SimpleAssessor {
        SimpleAssessor::new("simple", Arc::new(FixedIdGenerator("a-1".into())), Arc::new(FixedTimeProvider(0)))
    }

    #[test]
    fn complete_with_all_successful_claims_succeeds() {
        let claims = base_result(CompletionStatus::Complete, vec![Claim::success("a"), Claim::success("b")]);
        let result = assessor().assess(&claims, &TraceContext::root());
        assert!(result.success);
        assert!(result.failed_claims.is_empty());
    }

    #[test]
    fn any_failed_claim_fails_the_assessment() {
        let claims = base_result(
            CompletionStatus::Complete,
            vec![Claim::success("a"), Claim::failure("b", "bad")],
        );
        let result = assessor().assess(&claims, &TraceContext::root());
        assert!(!result.success);
        assert_eq!(result.failed_claims, vec!["b".to_string()]);
    }

    #[test]
    fn cancelled_run_never_succeeds_even_with_no_failed_claims() {
        let claims = base_result(CompletionStatus::Cancelled, vec![Claim::success("a")]);
        let result = assessor().assess(&claims, &TraceContext::root());
        assert!(!result.success);
    }
}
