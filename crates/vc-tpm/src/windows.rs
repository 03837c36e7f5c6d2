//! Windows TBS (TPM Base Services) backend.
//!
//! The actual `Tbsi_Context_Create` / `Tbsip_Submit_Command` bindings are an
//! external collaborator per the design's out-of-scope list — this module
//! only carries the backend surface and the constants a caller wires a real
//! TBS binding through. Built only under `cfg(windows)`.

use crate::backend::TpmBackend;
use crate::error::{Platform, TpmTransportFailure};

/// `TBS_CONTEXT_VERSION_TWO` — request a TPM 2.0-capable context.
pub const TBS_CONTEXT_VERSION: u32 = 2;

/// `TBS_CONTEXT_CREATE_FLAG_INCLUDE_TPM20` — include TPM 2.0 devices when
/// TBS enumerates the platform's TPM.
pub const TBS_CONTEXT_INCLUDE_TPM20: u32 = 4;

/// Default locality for a `Tbsip_Submit_Command` call.
pub const TBS_LOCALITY_ZERO: u32 = 0;

/// Default submit priority (`TBS_COMMAND_PRIORITY_NORMAL`).
pub const TBS_PRIORITY_NORMAL: u32 = 200;

/// A TBS context handle, as produced by `Tbsi_Context_Create`. Opaque here
/// because this module does not link the TBS FFI itself — a real binding
/// would hold the `TBS_HCONTEXT` FFI handle in place of this unit struct.
pub struct WindowsBackend;

impl WindowsBackend {
    /// Open a TBS context with `Version=2, Flags=INCLUDE_TPM20`. Returns a
    /// transport error until a real TBS FFI binding is linked in — the
    /// surface (submit/platform) is stable so swapping the binding in later
    /// does not change `TpmDevice` callers.
    pub fn open() -> Result<Self, TpmTransportFailure> {
        Err(TpmTransportFailure {
            code: 0,
            platform: Platform::Windows,
            reason: "Tbsi_Context_Create requires a linked TBS FFI binding, none is wired in this build".into(),
        })
    }
}

impl TpmBackend for WindowsBackend {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn submit_raw(&self, _command: &[u8]) -> Result<Vec<u8>, TpmTransportFailure> {
        Err(TpmTransportFailure {
            code: 0,
            platform: Platform::Windows,
            reason: "Tbsip_Submit_Command requires a linked TBS FFI binding".into(),
        })
    }
}
