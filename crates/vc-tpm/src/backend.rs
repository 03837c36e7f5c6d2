use crate::error::{Platform, TpmTransportFailure};
use crate::response::MAX_RESPONSE_LEN;

/// What a `TpmDevice` actually talks to. The device layer owns response
/// parsing (header validation, response-code classification) and the
/// observer/latch contract; a backend's only job is to move command bytes
/// out and response bytes back, reporting transport-level failure.
pub trait TpmBackend: Send + Sync {
    fn platform(&self) -> Platform;
    fn submit_raw(&self, command: &[u8]) -> Result<Vec<u8>, TpmTransportFailure>;
}

/// Backend taking a user-supplied closure — the "virtual" backend named in
/// the design for tests and simulated hardware (and for driving the
/// observer/latch contract without a real TPM present).
pub struct VirtualBackend<F> {
    f: F,
}

impl<F> VirtualBackend<F>
where
    F: Fn(&[u8]) -> Result<Vec<u8>, TpmTransportFailure> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> TpmBackend for VirtualBackend<F>
where
    F: Fn(&[u8]) -> Result<Vec<u8>, TpmTransportFailure> + Send + Sync,
{
    fn platform(&self) -> Platform {
        Platform::Virtual
    }

    fn submit_raw(&self, command: &[u8]) -> Result<Vec<u8>, TpmTransportFailure> {
        (self.f)(command)
    }
}

/// Guard against a response that oversteps the implementation limit before
/// it is ever copied into a pooled buffer.
pub(crate) fn check_response_len(
    platform: Platform,
    bytes: &[u8],
) -> Result<(), TpmTransportFailure> {
    if bytes.len() > MAX_RESPONSE_LEN {
        return Err(TpmTransportFailure {
            code: 0,
            platform,
            reason: format!(
                "response of {} bytes exceeds the {}-byte implementation limit",
                bytes.len(),
                MAX_RESPONSE_LEN
            ),
        });
    }
    Ok(())
}
