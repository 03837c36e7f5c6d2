use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};
use vc_core::{MaterialSemantics, Purpose, Tag};
use vc_crypto::Pool;

use crate::backend::{TpmBackend, VirtualBackend};
use crate::error::{Platform, TpmTransportFailure};
use crate::exchange::{self, now_ticks, Observer, ObserverList, Subscription, TpmExchange};
use crate::response::{TpmResponse, RESPONSE_HEADER_LEN};
use crate::result::TpmResult;

#[cfg(target_os = "linux")]
use crate::linux::{LinuxBackend, DEFAULT_TPM_PATH};

#[cfg(windows)]
use crate::windows::WindowsBackend;

/// A single TPM 2.0 command/response channel. Construction picks (or is
/// given) a platform backend; every other concern — response-code
/// classification, the observer stream, and the permanent-failure latch —
/// lives here, independent of which backend is underneath.
pub struct TpmDevice {
    backend: Box<dyn TpmBackend>,
    observers: Arc<ObserverList>,
    failure: OnceLock<TpmTransportFailure>,
    closed: AtomicBool,
}

impl TpmDevice {
    fn new(backend: Box<dyn TpmBackend>) -> Self {
        Self {
            backend,
            observers: ObserverList::new(),
            failure: OnceLock::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Open the Linux resource-manager device node at the default path
    /// (`/dev/tpmrm0`) — never `/dev/tpm0`, see `linux` module docs.
    #[cfg(target_os = "linux")]
    pub fn open_linux() -> Result<Self, TpmTransportFailure> {
        Self::open_linux_at(DEFAULT_TPM_PATH)
    }

    #[cfg(target_os = "linux")]
    pub fn open_linux_at(path: &str) -> Result<Self, TpmTransportFailure> {
        let backend = LinuxBackend::open(path)?;
        Ok(Self::new(Box::new(backend)))
    }

    /// Open a Windows TBS context. See `windows` module docs: the FFI
    /// binding itself is an external collaborator, so this surfaces a
    /// descriptive transport error until one is linked in.
    #[cfg(windows)]
    pub fn open_windows() -> Result<Self, TpmTransportFailure> {
        let backend = WindowsBackend::open()?;
        Ok(Self::new(Box::new(backend)))
    }

    /// Build a device around a user-supplied backend — the virtual
    /// backend's host, for tests and simulated hardware.
    pub fn with_backend(backend: impl TpmBackend + 'static) -> Self {
        Self::new(Box::new(backend))
    }

    /// Convenience constructor for a virtual (closure-backed) device.
    pub fn virtual_device<F>(f: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, TpmTransportFailure> + Send + Sync + 'static,
    {
        Self::new(Box::new(VirtualBackend::new(f)))
    }

    pub fn platform(&self) -> Platform {
        self.backend.platform()
    }

    /// Whether this device's permanent-failure latch has tripped. After
    /// this is true, every `submit` short-circuits without touching the
    /// backend.
    pub fn is_latched(&self) -> bool {
        self.failure.get().is_some()
    }

    pub fn latched_failure(&self) -> Option<&TpmTransportFailure> {
        self.failure.get()
    }

    /// Subscribe to the exchange stream. Command/response bytes are only
    /// cloned into a `TpmExchange` while at least one subscription is live.
    pub fn subscribe(&self, observer: Observer) -> Subscription {
        exchange::subscribe(&self.observers, observer)
    }

    /// Submit a command and classify the outcome. Once latched, every call
    /// returns the same `TransportError` without invoking the backend
    /// again — the kernel resource manager invalidates all transient
    /// handles once the underlying connection drops, so there is nothing a
    /// retry could recover.
    pub fn submit(&self, command: &[u8], pool: &Pool) -> TpmResult<TpmResponse> {
        if let Some(failure) = self.failure.get() {
            return TpmResult::TransportError(failure.clone());
        }
        if self.closed.load(Ordering::Acquire) {
            let failure = TpmTransportFailure {
                code: 0,
                platform: self.platform(),
                reason: "device is closed".into(),
            };
            return TpmResult::TransportError(failure);
        }

        let start_ticks = now_ticks();
        let raw = self.backend.submit_raw(command);
        let end_ticks = now_ticks();

        let bytes = match raw {
            Ok(bytes) => bytes,
            Err(failure) => {
                warn!(platform = %failure.platform, reason = %failure.reason, "TPM transport failure, latching device");
                let latched = self.failure.get_or_init(|| failure);
                return TpmResult::TransportError(latched.clone());
            }
        };

        if bytes.len() < RESPONSE_HEADER_LEN {
            let failure = TpmTransportFailure {
                code: 0,
                platform: self.platform(),
                reason: format!(
                    "TPM response of {} bytes is shorter than the {}-byte header",
                    bytes.len(),
                    RESPONSE_HEADER_LEN
                ),
            };
            warn!(reason = %failure.reason, "malformed TPM response, latching device");
            let latched = self.failure.get_or_init(|| failure);
            return TpmResult::TransportError(latched.clone());
        }
        if let Err(failure) = crate::backend::check_response_len(self.platform(), &bytes) {
            warn!(reason = %failure.reason, "oversized TPM response, latching device");
            let latched = self.failure.get_or_init(|| failure);
            return TpmResult::TransportError(latched.clone());
        }

        if !self.observers.is_empty() {
            self.observers.notify(&TpmExchange {
                start_ticks,
                end_ticks,
                command: command.to_vec(),
                response: bytes.clone(),
            });
        }

        let response_code = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        if response_code == 0 {
            debug!(platform = %self.platform(), "TPM submit succeeded");
            TpmResult::Success(TpmResponse::from_bytes(pool, &bytes))
        } else {
            TpmResult::TpmError(crate::error::TpmCode(response_code))
        }
    }

    /// Release platform resources. Idempotent: a second `close` is a
    /// no-op, and any in-flight or subsequent `submit` after `close`
    /// reports a transport error instead of touching the backend.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.observers.notify(&TpmExchange {
            start_ticks: now_ticks(),
            end_ticks: now_ticks(),
            command: Vec::new(),
            response: Vec::new(),
        });
    }
}

impl Drop for TpmDevice {
    fn drop(&mut self) {
        self.close();
    }
}

/// A sensitive-buffer tag fitting a TPM command/response byte string, for
/// callers that rent a buffer to assemble a command before calling
/// `submit`.
pub fn command_tag() -> Tag {
    Tag::new(Purpose::Transport, MaterialSemantics::TpmHandle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn success_response(code_is_success: bool) -> Vec<u8> {
        let mut bytes = vec![0x80, 0x01, 0, 0, 0, 10, 0, 0, 0, 0];
        let code: u32 = if code_is_success { 0 } else { 0x900 | 0x022 };
        bytes[6..10].copy_from_slice(&code.to_be_bytes());
        bytes
    }

    #[test]
    fn successful_submit_parses_success_response_code() {
        let device = TpmDevice::virtual_device(|_cmd| Ok(success_response(true)));
        let pool = Pool;
        let result = device.submit(b"cmd", &pool);
        assert!(result.is_success());
    }

    #[test]
    fn tpm_error_response_code_is_not_a_transport_error_and_does_not_latch() {
        let device = TpmDevice::virtual_device(|_cmd| Ok(success_response(false)));
        let pool = Pool;
        let r1 = device.submit(b"cmd", &pool);
        assert!(r1.is_tpm_error());
        assert!(r1.is_retryable());
        assert!(!device.is_latched());

        let r2 = device.submit(b"cmd", &pool);
        assert!(r2.is_tpm_error());
    }

    #[test]
    fn transport_failure_latches_and_all_further_submits_short_circuit() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = Arc::clone(&attempts);
        let device = TpmDevice::virtual_device(move |_cmd| {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
            Err(TpmTransportFailure { code: 7, platform: Platform::Virtual, reason: "severed".into() })
        });
        let pool = Pool;

        let first = device.submit(b"cmd", &pool);
        assert!(first.is_transport_error());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        for _ in 0..3 {
            let r = device.submit(b"cmd", &pool);
            assert_eq!(r, first);
        }
        // The backend closure was never invoked again after the first failure.
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observers_receive_one_exchange_per_successful_submit() {
        let device = TpmDevice::virtual_device(|_cmd| Ok(success_response(true)));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let _sub = device.subscribe(Arc::new(move |ex: &TpmExchange| {
            seen_clone.lock().unwrap().push(ex.command.clone());
        }));

        let pool = Pool;
        device.submit(b"cmd-a", &pool);
        device.submit(b"cmd-b", &pool);

        let captured = seen.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0], b"cmd-a");
        assert_eq!(captured[1], b"cmd-b");
    }

    #[test]
    fn malformed_short_response_latches_as_transport_error() {
        let device = TpmDevice::virtual_device(|_cmd| Ok(vec![1, 2, 3]));
        let pool = Pool;
        let result = device.submit(b"cmd", &pool);
        assert!(result.is_transport_error());
        assert!(device.is_latched());
    }

    #[test]
    fn close_is_idempotent_and_submits_after_close_fail_closed() {
        let device = TpmDevice::virtual_device(|_cmd| Ok(success_response(true)));
        device.close();
        device.close();
        let pool = Pool;
        let result = device.submit(b"cmd", &pool);
        assert!(result.is_transport_error());
    }
}
