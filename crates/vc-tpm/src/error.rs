use thiserror::Error;

/// TPM platform this device is talking to. Carried on `TransportError` so a
/// caller logging a latch can tell a Linux `/dev/tpmrm0` failure apart from
/// a Windows TBS one without inspecting the backend directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
    Virtual,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::Virtual => "virtual",
        };
        f.write_str(s)
    }
}

/// A non-success TPM response code (the 4-byte `responseCode` field of the
/// response header, RC_FMT1/RC_VER1 layouts per TPM 2.0 Part 1 §6.6).
///
/// TPM 2.0 response codes pack the failure category into high bits and a
/// parameter/handle/session index into low bits when the format-one bit
/// (bit 7) is set; the predicates below decode those bit fields rather
/// than maintaining a side table of known codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TpmCode(pub u32);

const RC_FMT1: u32 = 0x080;
const RC_VER1: u32 = 0x100;
const RC_WARN: u32 = 0x900;

// TPM_RC_RETRY / TPM_RC_YIELDED are TPM_RC_WARN-format codes.
const RC_RETRY: u32 = RC_WARN | 0x022;
const RC_YIELDED: u32 = RC_WARN | 0x008;
const RC_NV_RATE: u32 = RC_WARN | 0x020;
const RC_LOCKOUT: u32 = RC_VER1 | 0x021;
const RC_TESTING: u32 = RC_WARN | 0x00a;
const RC_REBOOT: u32 = RC_WARN | 0x030;

impl TpmCode {
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is an `RC_FMT1`-layout code (bit 7 set): the low 6 bits
    /// then carry a parameter (`N` set), handle, or session index.
    const fn is_fmt1(self) -> bool {
        self.0 & RC_FMT1 != 0
    }

    /// 1-based parameter index this code names, if `RC_FMT1` and the
    /// parameter-number bit (bit 6) is set.
    pub const fn parameter_index(self) -> Option<u8> {
        if self.is_fmt1() && self.0 & 0x040 != 0 {
            Some((self.0 & 0x00f) as u8)
        } else {
            None
        }
    }

    /// 1-based handle index this code names, if `RC_FMT1` and the
    /// parameter-number bit is clear but the index is in the handle range.
    pub const fn handle_index(self) -> Option<u8> {
        if self.is_fmt1() && self.0 & 0x040 == 0 && self.0 & 0x008 == 0 {
            Some((self.0 & 0x007) as u8)
        } else {
            None
        }
    }

    /// 1-based session index this code names, if `RC_FMT1` and the
    /// session-range bit (bit 3) is set.
    pub const fn session_index(self) -> Option<u8> {
        if self.is_fmt1() && self.0 & 0x040 == 0 && self.0 & 0x008 != 0 {
            Some((self.0 & 0x007) as u8)
        } else {
            None
        }
    }

    pub const fn is_warning(self) -> bool {
        !self.is_fmt1() && self.0 & 0xf00 == RC_WARN
    }

    /// `TPM_RC_RETRY` or `TPM_RC_YIELDED`: the command can be resubmitted
    /// as-is.
    pub const fn is_retryable(self) -> bool {
        self.0 == RC_RETRY || self.0 == RC_YIELDED
    }

    /// `TPM_RC_NV_RATE`: the TPM is throttling NV writes.
    pub const fn is_rate_limited(self) -> bool {
        self.0 == RC_NV_RATE
    }

    /// `TPM_RC_LOCKOUT`: authorization is locked out pending recovery time.
    pub const fn is_in_lockout(self) -> bool {
        self.0 == RC_LOCKOUT
    }

    /// `TPM_RC_TESTING`: the TPM is still running self-tests.
    pub const fn is_testing(self) -> bool {
        self.0 == RC_TESTING
    }

    /// `TPM_RC_REBOOT` (or equivalent init-required warning): the caller
    /// must power-cycle or re-init the TPM before retrying anything.
    pub const fn requires_reboot(self) -> bool {
        self.0 == RC_REBOOT
    }
}

/// Set exactly once per `TpmDevice`, on the first transport failure.
/// Immutable: every subsequent `submit` call returns this same value
/// rather than re-touching the platform transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("TPM transport failure on {platform}: {reason} (code {code:#x})")]
pub struct TpmTransportFailure {
    pub code: u32,
    pub platform: Platform,
    pub reason: String,
}

/// Failure taxonomy for a `TpmDevice::submit` call. `TpmError` is a
/// non-success response the TPM itself returned over an otherwise healthy
/// transport; `TransportError` means the transport is unhealthy and the
/// device's permanent latch has now been (or already was) set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TpmError {
    #[error("TPM returned response code {:#x}", .0.raw())]
    TpmError(TpmCode),

    #[error(transparent)]
    TransportError(TpmTransportFailure),

    #[error("malformed TPM response: {0}")]
    MalformedResponse(String),
}

impl TpmError {
    pub fn transport(code: u32, platform: Platform, reason: impl Into<String>) -> Self {
        TpmError::TransportError(TpmTransportFailure { code, platform, reason: reason.into() })
    }
}
