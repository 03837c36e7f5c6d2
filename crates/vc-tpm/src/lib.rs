//! vc-tpm
//!
//! Hardened TPM 2.0 command transport: a cross-platform device abstraction
//! (`TpmDevice`) that serializes commands to a platform backend, classifies
//! every response into a `TpmResult`, tracks a permanent transport-failure
//! latch, and exposes an observable exchange stream for recording/replay.
//!
//! Platform backends: Linux `/dev/tpmrm0` (resource-manager only, opened
//! defensively against symlink/TOCTOU attacks), Windows TBS (behind a
//! `cfg(windows)` stub — the FFI binding itself is an external
//! collaborator), and a virtual backend taking a closure, used throughout
//! this crate's own tests and by callers simulating hardware.

pub mod backend;
pub mod device;
pub mod error;
pub mod exchange;
pub mod response;
pub mod result;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(windows)]
pub mod windows;

pub use backend::{TpmBackend, VirtualBackend};
pub use device::{command_tag, TpmDevice};
pub use error::{Platform, TpmCode, TpmError, TpmTransportFailure};
pub use exchange::{Observer, Subscription, TpmExchange};
pub use response::{TpmResponse, MAX_RESPONSE_LEN, RESPONSE_HEADER_LEN};
pub use result::TpmResult;
