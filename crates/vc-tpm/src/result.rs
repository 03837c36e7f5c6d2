use crate::error::{Platform, TpmCode, TpmTransportFailure};

/// Three-state result of a TPM submit: exactly one branch is ever
/// inhabited. Distinguishing `TpmError` (the TPM answered, just not with
/// success) from `TransportError` (the channel itself is unhealthy) lets
/// callers decide retry policy without string-matching an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TpmResult<T> {
    Success(T),
    TpmError(TpmCode),
    TransportError(TpmTransportFailure),
}

impl<T> TpmResult<T> {
    pub const fn is_success(&self) -> bool {
        matches!(self, TpmResult::Success(_))
    }

    pub const fn is_tpm_error(&self) -> bool {
        matches!(self, TpmResult::TpmError(_))
    }

    pub const fn is_transport_error(&self) -> bool {
        matches!(self, TpmResult::TransportError(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            TpmResult::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn tpm_code(&self) -> Option<TpmCode> {
        match self {
            TpmResult::TpmError(c) => Some(*c),
            _ => None,
        }
    }

    pub fn transport_failure(&self) -> Option<&TpmTransportFailure> {
        match self {
            TpmResult::TransportError(f) => Some(f),
            _ => None,
        }
    }

    /// 1-based parameter index the TPM blamed, if this is an `RC_FMT1`
    /// parameter-shaped `TpmError`.
    pub fn parameter_index(&self) -> Option<u8> {
        self.tpm_code().and_then(TpmCode::parameter_index)
    }

    /// 1-based handle index the TPM blamed, if this is an `RC_FMT1`
    /// handle-shaped `TpmError`.
    pub fn handle_index(&self) -> Option<u8> {
        self.tpm_code().and_then(TpmCode::handle_index)
    }

    /// 1-based session index the TPM blamed, if this is an `RC_FMT1`
    /// session-shaped `TpmError`.
    pub fn session_index(&self) -> Option<u8> {
        self.tpm_code().and_then(TpmCode::session_index)
    }

    pub fn is_warning(&self) -> bool {
        self.tpm_code().is_some_and(TpmCode::is_warning)
    }

    pub fn is_retryable(&self) -> bool {
        self.tpm_code().is_some_and(TpmCode::is_retryable)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.tpm_code().is_some_and(TpmCode::is_rate_limited)
    }

    pub fn is_in_lockout(&self) -> bool {
        self.tpm_code().is_some_and(TpmCode::is_in_lockout)
    }

    pub fn is_testing(&self) -> bool {
        self.tpm_code().is_some_and(TpmCode::is_testing)
    }

    pub fn requires_reboot(&self) -> bool {
        self.tpm_code().is_some_and(TpmCode::requires_reboot)
    }

    /// Apply `f` to a `Success` value, preserving the `TpmError` /
    /// `TransportError` branch otherwise.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TpmResult<U> {
        match self {
            TpmResult::Success(v) => TpmResult::Success(f(v)),
            TpmResult::TpmError(c) => TpmResult::TpmError(c),
            TpmResult::TransportError(e) => TpmResult::TransportError(e),
        }
    }

    /// Chain a fallible continuation that itself returns a `TpmResult`,
    /// short-circuiting on either error branch.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> TpmResult<U>) -> TpmResult<U> {
        match self {
            TpmResult::Success(v) => f(v),
            TpmResult::TpmError(c) => TpmResult::TpmError(c),
            TpmResult::TransportError(e) => TpmResult::TransportError(e),
        }
    }

    /// Exhaustive three-way match, one callback per branch.
    pub fn match_branch<U>(
        self,
        on_success: impl FnOnce(T) -> U,
        on_tpm_error: impl FnOnce(TpmCode) -> U,
        on_transport_error: impl FnOnce(TpmTransportFailure) -> U,
    ) -> U {
        match self {
            TpmResult::Success(v) => on_success(v),
            TpmResult::TpmError(c) => on_tpm_error(c),
            TpmResult::TransportError(e) => on_transport_error(e),
        }
    }
}

impl<T> From<crate::error::TpmError> for TpmResult<T> {
    fn from(e: crate::error::TpmError) -> Self {
        match e {
            crate::error::TpmError::TpmError(c) => TpmResult::TpmError(c),
            crate::error::TpmError::TransportError(f) => TpmResult::TransportError(f),
            crate::error::TpmError::MalformedResponse(msg) => {
                TpmResult::TransportError(TpmTransportFailure {
                    code: 0,
                    platform: Platform::Virtual,
                    reason: msg,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_predicate_is_true_per_branch() {
        let cases: Vec<TpmResult<u8>> = vec![
            TpmResult::Success(1),
            TpmResult::TpmError(TpmCode(0x900 | 0x022)),
            TpmResult::TransportError(TpmTransportFailure {
                code: 5,
                platform: Platform::Linux,
                reason: "closed".into(),
            }),
        ];
        for case in cases {
            let flags = [case.is_success(), case.is_tpm_error(), case.is_transport_error()];
            assert_eq!(flags.iter().filter(|b| **b).count(), 1);
        }
    }

    #[test]
    fn retry_and_yielded_are_retryable() {
        assert!(TpmResult::<()>::TpmError(TpmCode(0x900 | 0x022)).is_retryable());
        assert!(TpmResult::<()>::TpmError(TpmCode(0x900 | 0x008)).is_retryable());
        assert!(!TpmResult::<()>::TpmError(TpmCode(0x900 | 0x020)).is_retryable());
    }

    #[test]
    fn lockout_and_rate_limit_predicates() {
        assert!(TpmResult::<()>::TpmError(TpmCode(0x100 | 0x021)).is_in_lockout());
        assert!(TpmResult::<()>::TpmError(TpmCode(0x900 | 0x020)).is_rate_limited());
    }

    #[test]
    fn fmt1_parameter_index_decodes() {
        // RC_FMT1 | parameter-bit | N=3
        let code = TpmCode(0x080 | 0x040 | 0x003);
        assert_eq!(code.parameter_index(), Some(3));
        assert_eq!(code.handle_index(), None);
        assert_eq!(code.session_index(), None);
    }

    #[test]
    fn map_preserves_error_branches() {
        let err: TpmResult<u8> = TpmResult::TpmError(TpmCode(1));
        let mapped = err.map(|v| v as u32);
        assert!(mapped.is_tpm_error());
    }
}
