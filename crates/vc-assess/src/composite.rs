use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use vc_core::TimeProvider;

use crate::id::ResultIdGenerator;
use crate::issuer::ClaimIssueResult;
use crate::simple::AssessmentResult;
use crate::trace::TraceContext;

/// One participant in a `CompositeAssessor`. Implementors own whatever
/// state they need (a `SimpleAssessor`, a remote check, ...) and return an
/// owned future so the composite can spawn it onto the ambient executor.
pub trait Assessor: Send + Sync {
    fn assessor_id(&self) -> &str;

    fn assess(
        &self,
        claims: ClaimIssueResult,
        trace: TraceContext,
    ) -> BoxFuture<'static, AssessmentResult>;

    /// Per-assessor timeout. `None` means only the outer cancellation
    /// token can stop this assessor.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessorStatus {
    Completed,
    Cancelled,
    TimedOut,
    Faulted,
}

#[derive(Debug, Clone)]
pub struct IndividualAssessorResult {
    pub assessor_id: String,
    pub status: AssessorStatus,
    pub result: Option<AssessmentResult>,
    pub error: Option<String>,
    pub duration: Duration,
    pub span_id: String,
}

impl IndividualAssessorResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, AssessorStatus::Completed) && self.result.as_ref().is_some_and(|r| r.success)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum AggregationStrategy {
    AllMustSucceed,
    AnyMustSucceed,
    MajorityMustSucceed,
    QuorumMustSucceed { required_quorum: i64 },
}

#[derive(Debug, Clone)]
pub struct AggregatedAssessmentResult {
    pub id: String,
    pub source_claim_result_id: String,
    pub individual: Vec<IndividualAssessorResult>,
    pub is_success: bool,
    pub assessed_at: i64,
    pub trace_id: String,
}

/// `required_quorum <= 0` defaults to `floor(N/2)+1`, matching the way a
/// zero/negative config value is treated as "unset" elsewhere in this
/// pipeline.
fn effective_quorum(required_quorum: i64, n: usize) -> usize {
    if required_quorum <= 0 {
        n / 2 + 1
    } else {
        required_quorum as usize
    }
}

fn derive_success(
    claims_complete: bool,
    strategy: AggregationStrategy,
    individual: &[IndividualAssessorResult],
) -> bool {
    if !claims_complete {
        return false;
    }
    let n = individual.len();
    let completed: Vec<&IndividualAssessorResult> = individual
        .iter()
        .filter(|r| r.status == AssessorStatus::Completed)
        .collect();
    let successes = completed.iter().filter(|r| r.succeeded()).count();

    match strategy {
        AggregationStrategy::AllMustSucceed => completed.len() == n && successes == n,
        AggregationStrategy::AnyMustSucceed => successes > 0,
        AggregationStrategy::MajorityMustSucceed => successes > n / 2,
        AggregationStrategy::QuorumMustSucceed { required_quorum } => {
            let quorum = effective_quorum(required_quorum, n);
            completed.len() >= quorum && successes == completed.len()
        }
    }
}

/// Runs N assessors concurrently against one claim result, combining each
/// assessor's own timeout with a shared outer cancellation token.
pub struct CompositeAssessor {
    assessors: Vec<Arc<dyn Assessor>>,
    strategy: AggregationStrategy,
    id_gen: Arc<dyn ResultIdGenerator>,
    time: Arc<dyn TimeProvider>,
}

impl CompositeAssessor {
    pub fn new(
        assessors: Vec<Arc<dyn Assessor>>,
        strategy: AggregationStrategy,
        id_gen: Arc<dyn ResultIdGenerator>,
        time: Arc<dyn TimeProvider>,
    ) -> Self {
        Self { assessors, strategy, id_gen, time }
    }

    pub async fn assess(
        &self,
        claims: ClaimIssueResult,
        trace: TraceContext,
        cancel: CancellationToken,
    ) -> AggregatedAssessmentResult {
        let claims_complete = claims.is_complete();
        let mut joinset: JoinSet<IndividualAssessorResult> = JoinSet::new();

        for assessor in &self.assessors {
            let assessor = Arc::clone(assessor);
            let claims = claims.clone();
            let span = trace.child_span();
            let cancel = cancel.clone();
            let timeout = assessor.timeout();

            joinset.spawn(async move {
                let assessor_id = assessor.assessor_id().to_string();
                let span_id = span.span_id.clone();
                let started = std::time::Instant::now();
                let fut = AssertUnwindSafe(assessor.assess(claims, span)).catch_unwind();

                // `biased` gives the outer cancellation token priority over a
                // per-assessor timeout firing at the same instant, matching
                // the documented precedence: external cancellation wins ties.
                let outcome = if let Some(duration) = timeout {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        _ = tokio::time::sleep(duration) => Some(Err(())),
                        r = fut => Some(Ok(r)),
                    }
                } else {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        r = fut => Some(Ok(r)),
                    }
                };

                let duration = started.elapsed();
                match outcome {
                    None => IndividualAssessorResult {
                        assessor_id,
                        status: AssessorStatus::Cancelled,
                        result: None,
                        error: None,
                        duration,
                        span_id,
                    },
                    Some(Err(())) => IndividualAssessorResult {
                        assessor_id,
                        status: AssessorStatus::TimedOut,
                        result: None,
                        error: None,
                        duration,
                        span_id,
                    },
                    Some(Ok(Ok(result))) => IndividualAssessorResult {
                        assessor_id,
                        status: AssessorStatus::Completed,
                        result: Some(result),
                        error: None,
                        duration,
                        span_id,
                    },
                    Some(Ok(Err(panic))) => {
                        let message = panic_message(panic);
                        IndividualAssessorResult {
                            assessor_id,
                            status: AssessorStatus::Faulted,
                            result: None,
                            error: Some(message),
                            duration,
                            span_id,
                        }
                    }
                }
            });
        }

        let mut individual = Vec::with_capacity(self.assessors.len());
        while let Some(joined) = joinset.join_next().await {
            match joined {
                Ok(r) => individual.push(r),
                Err(join_err) => individual.push(IndividualAssessorResult {
                    assessor_id: "unknown".into(),
                    status: AssessorStatus::Faulted,
                    result: None,
                    error: Some(join_err.to_string()),
                    duration: Duration::ZERO,
                    span_id: String::new(),
                }),
            }
        }

        let is_success = derive_success(claims_complete, self.strategy, &individual);

        AggregatedAssessmentResult {
            id: self.id_gen.next_id(),
            source_claim_result_id: claims.id,
            individual,
            is_success,
            assessed_at: self.time.utc_now(),
            trace_id: trace.trace_id,
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "assessor panicked".to_string()
    }
}
