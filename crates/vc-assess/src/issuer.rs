use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vc_core::{TimeProvider, VcResult};

use crate::claim::Claim;
use crate::id::ResultIdGenerator;
use crate::trace::TraceContext;

/// Whether a `ClaimIssueResult` ran every rule to completion or stopped
/// early because cancellation was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Complete,
    Cancelled,
}

/// `(input, cancel) -> claims` — a rule may cooperate with cancellation by
/// checking `cancel.is_cancelled()` itself, but is not required to; the
/// issuer also checks between rules regardless.
pub type ClaimRuleFn<I> = Arc<dyn Fn(&I, &CancellationToken) -> VcResult<Vec<Claim>> + Send + Sync>;

#[derive(Clone)]
pub struct ClaimRule<I> {
    pub name: String,
    pub run: ClaimRuleFn<I>,
}

impl<I> ClaimRule<I> {
    pub fn new(name: impl Into<String>, run: ClaimRuleFn<I>) -> Self {
        Self { name: name.into(), run }
    }
}

/// Immutable outcome of one `ClaimIssuer::generate_claims` run.
#[derive(Debug, Clone)]
pub struct ClaimIssueResult {
    pub id: String,
    pub issuer_id: String,
    pub correlation_id: String,
    pub claims: Vec<Claim>,
    pub created_at: i64,
    pub completion_status: CompletionStatus,
    pub rules_executed: u32,
    pub total_rules: u32,
    pub trace_id: String,
    pub span_id: String,
    pub baggage: BTreeMap<String, String>,
}

impl ClaimIssueResult {
    pub fn is_complete(&self) -> bool {
        self.completion_status == CompletionStatus::Complete
    }
}

/// Holds an ordered list of validation rules and runs them in order against
/// one input, converting any rule fault into a synthetic `Claim` rather
/// than propagating it.
pub struct ClaimIssuer<I> {
    issuer_id: String,
    rules: Vec<ClaimRule<I>>,
    id_gen: Arc<dyn ResultIdGenerator>,
    time: Arc<dyn TimeProvider>,
}

impl<I> ClaimIssuer<I> {
    pub fn new(
        issuer_id: impl Into<String>,
        id_gen: Arc<dyn ResultIdGenerator>,
        time: Arc<dyn TimeProvider>,
    ) -> Self {
        Self { issuer_id: issuer_id.into(), rules: Vec::new(), id_gen, time }
    }

    pub fn with_rule(mut self, rule: ClaimRule<I>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Run every rule in order. Stops and marks `Cancelled` the moment
    /// cancellation is observed, whether that's noticed before a rule runs
    /// or a rule itself returns early because it saw cancellation — both
    /// are treated identically.
    pub fn generate_claims(
        &self,
        input: &I,
        correlation_id: impl Into<String>,
        cancel: &CancellationToken,
        trace: &TraceContext,
    ) -> ClaimIssueResult {
        let id = self.id_gen.next_id();
        let mut claims = Vec::new();
        let mut rules_executed = 0u32;
        let total_rules = self.rules.len() as u32;
        let mut status = CompletionStatus::Complete;

        for rule in &self.rules {
            if cancel.is_cancelled() {
                status = CompletionStatus::Cancelled;
                break;
            }
            match (rule.run)(input, cancel) {
                Ok(produced) => claims.extend(produced),
                Err(e) => claims.push(Claim::synthetic_failure(&rule.name, e.to_string())),
            }
            rules_executed += 1;
            if cancel.is_cancelled() {
                status = CompletionStatus::Cancelled;
                break;
            }
        }

        ClaimIssueResult {
            id,
            issuer_id: self.issuer_id.clone(),
            correlation_id: correlation_id.into(),
            claims,
            created_at: self.time.utc_now(),
            completion_status: status,
            rules_executed,
            total_rules,
            trace_id: trace.trace_id.clone(),
            span_id: trace.span_id.clone(),
            baggage: trace.baggage.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::FixedIdGenerator;
    use vc_core::{FixedTimeProvider, VcError};

    fn issuer_with_rules(rules: Vec<ClaimRule<()>>) -> ClaimIssuer<()> {
        let mut issuer = ClaimIssuer::new(
            "test-issuer",
            Arc::new(FixedIdGenerator("r-1".into())),
            Arc::new(FixedTimeProvider(1_700_000_000)),
        );
        for rule in rules {
            issuer = issuer.with_rule(rule);
        }
        issuer
    }

    #[test]
    fn complete_run_executes_every_rule_and_preserves_invariant() {
        let rules = vec![
            ClaimRule::new("a", Arc::new(|_: &(), _c: &CancellationToken| Ok(vec![Claim::success("a")]))),
            ClaimRule::new("b", Arc::new(|_: &(), _c: &CancellationToken| Ok(vec![Claim::success("b")]))),
        ];
        let issuer = issuer_with_rules(rules);
        let result = issuer.generate_claims(&(), "corr-1", &CancellationToken::new(), &TraceContext::root());

        assert_eq!(result.completion_status, CompletionStatus::Complete);
        assert_eq!(result.rules_executed, result.total_rules);
        assert_eq!(result.claims.len(), 2);
        assert_eq!(result.correlation_id, "corr-1");
    }

    #[test]
    fn rule_error_becomes_synthetic_failed_claim_not_a_propagated_error() {
        let rules = vec![ClaimRule::new(
            "faulty",
            Arc::new(|_: &(), _c: &CancellationToken| Err(VcError::Fault("boom".into()))),
        )];
        let issuer = issuer_with_rules(rules);
        let result = issuer.generate_claims(&(), "corr-2", &CancellationToken::new(), &TraceContext::root());

        assert_eq!(result.completion_status, CompletionStatus::Complete);
        assert_eq!(result.claims.len(), 1);
        assert!(!result.claims[0].is_success());
        assert!(result.claims[0].name.contains("faulty"));
    }

    #[test]
    fn pre_rule_cancellation_stops_before_any_rule_runs() {
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);
        let rules = vec![ClaimRule::new(
            "never",
            Arc::new(move |_: &(), _c: &CancellationToken| {
                ran_clone.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(vec![Claim::success("never")])
            }),
        )];
        let issuer = issuer_with_rules(rules);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = issuer.generate_claims(&(), "corr-3", &cancel, &TraceContext::root());

        assert_eq!(result.completion_status, CompletionStatus::Cancelled);
        assert_eq!(result.rules_executed, 0);
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn cancellation_observed_during_a_rule_stops_subsequent_rules() {
        let cancel = CancellationToken::new();
        let cancel_for_rule = cancel.clone();
        let rules = vec![
            ClaimRule::new(
                "cancels_self",
                Arc::new(move |_: &(), _c: &CancellationToken| {
                    cancel_for_rule.cancel();
                    Ok(vec![Claim::success("cancels_self")])
                }),
            ),
            ClaimRule::new("should_not_run", Arc::new(|_: &(), _c: &CancellationToken| {
                panic!("this rule must not run once cancellation is observed")
            })),
        ];
        let issuer = issuer_with_rules(rules);
        let result = issuer.generate_claims(&(), "corr-4", &cancel, &TraceContext::root());

        assert_eq!(result.completion_status, CompletionStatus::Cancelled);
        assert_eq!(result.rules_executed, 1);
        assert_eq!(result.claims.len(), 1);
    }
}
