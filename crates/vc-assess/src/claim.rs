/// Outcome of one validation claim. Only `Success` and `Failure` are
/// meaningful outcomes — cancellation and rule faults are represented at
/// the `ClaimIssueResult`/synthetic-claim level, not as a third outcome
/// variant, so an assessor never has to special-case a claim it doesn't
/// understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Success,
    Failure,
}

/// One immutable validation outcome produced by a claim rule (or
/// synthesized by the issuer when a rule itself faults).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub name: String,
    pub outcome: ClaimOutcome,
    pub detail: Option<String>,
}

impl Claim {
    pub fn success(name: impl Into<String>) -> Self {
        Self { name: name.into(), outcome: ClaimOutcome::Success, detail: None }
    }

    pub fn failure(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { name: name.into(), outcome: ClaimOutcome::Failure, detail: Some(detail.into()) }
    }

    /// A `FailedClaim(rule_name, message)` synthesized in place of a rule
    /// that faulted rather than returning claims — never swallowed, never
    /// propagated as an error.
    pub fn synthetic_failure(rule_name: &str, message: impl Into<String>) -> Self {
        Self::failure(format!("rule:{rule_name}"), message)
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ClaimOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_failure_names_the_faulting_rule() {
        let claim = Claim::synthetic_failure("age_check", "input missing birth_date");
        assert!(!claim.is_success());
        assert_eq!(claim.name, "rule:age_check");
        assert_eq!(claim.detail.as_deref(), Some("input missing birth_date"));
    }
}
