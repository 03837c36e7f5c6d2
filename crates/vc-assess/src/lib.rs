//! vc-assess
//!
//! The claim-issue -> assess -> archive pipeline: a claim issuer runs
//! validation rules against an input, one or more assessors judge the
//! resulting claims, and an archiver persists the outcome. Every stage
//! threads a `TraceContext` and honors `tokio_util::sync::CancellationToken`
//! cooperatively.

pub mod archiver;
pub mod claim;
pub mod composite;
pub mod id;
pub mod issuer;
pub mod simple;
pub mod trace;

pub use archiver::{ArchiveFn, ArchiveStatus, Archiver};
pub use claim::{Claim, ClaimOutcome};
pub use composite::{
    AggregatedAssessmentResult, AggregationStrategy, Assessor, AssessorStatus, CompositeAssessor,
    IndividualAssessorResult,
};
pub use id::{FixedIdGenerator, ResultIdGenerator, SequentialIdGenerator};
pub use issuer::{ClaimIssueResult, ClaimIssuer, ClaimRule, ClaimRuleFn, CompletionStatus};
pub use simple::{AssessmentResult, SimpleAssessor};
pub use trace::TraceContext;
