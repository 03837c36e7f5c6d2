/// Injected time source, matching the "Environment" clause of the crypto
/// substrate design: no component reads the system clock directly, so
/// claim issuance, assessment, and archiving are reproducible in tests.
pub trait TimeProvider: Send + Sync {
    /// Current time as Unix seconds (UTC).
    fn utc_now(&self) -> i64;
}

/// Production time source backed by the OS clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn utc_now(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Fixed time source for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeProvider(pub i64);

impl TimeProvider for FixedTimeProvider {
    fn utc_now(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_is_stable() {
        let t = FixedTimeProvider(1_700_000_000);
        assert_eq!(t.utc_now(), 1_700_000_000);
        assert_eq!(t.utc_now(), t.utc_now());
    }

    #[test]
    fn system_time_is_monotonic_nondecreasing() {
        let t = SystemTimeProvider;
        let a = t.utc_now();
        let b = t.utc_now();
        assert!(b >= a);
    }
}
