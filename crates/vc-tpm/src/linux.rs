//! Linux `/dev/tpmrm0` backend: the kernel's in-kernel resource manager
//! device node. We deliberately never fall back to `/dev/tpm0` (the raw
//! TPM device) — talking to the raw device without a resource manager in
//! front of it would require this crate to implement TPM session/handle
//! context management itself, which is out of scope.

use std::ffi::CString;
use std::os::unix::io::RawFd;

use crate::backend::{check_response_len, TpmBackend};
use crate::error::{Platform, TpmTransportFailure};
use crate::response::MAX_RESPONSE_LEN;

/// Default Linux TPM resource-manager endpoint.
pub const DEFAULT_TPM_PATH: &str = "/dev/tpmrm0";

pub struct LinuxBackend {
    fd: RawFd,
}

impl LinuxBackend {
    /// Open `path` defensively: `O_RDWR | O_NOFOLLOW | O_CLOEXEC` refuses a
    /// symlinked device node (TOCTOU hardening against an attacker who can
    /// race a symlink into place between path resolution and open), then
    /// `fstat` confirms the opened descriptor is actually a character
    /// device before any command is ever written to it.
    pub fn open(path: &str) -> Result<Self, TpmTransportFailure> {
        let fail = |reason: String| TpmTransportFailure { code: 0, platform: Platform::Linux, reason };

        let c_path = CString::new(path)
            .map_err(|e| fail(format!("TPM device path contains a NUL byte: {e}")))?;

        let flags = libc::O_RDWR | libc::O_NOFOLLOW | libc::O_CLOEXEC;
        let fd = unsafe { libc::open(c_path.as_ptr(), flags) };
        if fd < 0 {
            let errno = std::io::Error::last_os_error();
            return Err(fail(format!("opening {path}: {errno}")));
        }

        let mut stat: libc::stat = unsafe { std::mem::zeroed() };
        if unsafe { libc::fstat(fd, &mut stat) } != 0 {
            let errno = std::io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(fail(format!("fstat on {path}: {errno}")));
        }
        if stat.st_mode & libc::S_IFMT != libc::S_IFCHR {
            unsafe { libc::close(fd) };
            return Err(fail(format!(
                "{path} resolved to a non-character-device file (possible symlink attack)"
            )));
        }

        Ok(Self { fd })
    }
}

impl Drop for LinuxBackend {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

// SAFETY: the fd is never mutated, only read/written through syscalls that
// take `&self`; concurrent submits racing the same fd is a caller-discipline
// issue the device layer above does not attempt to serialize (§5).
unsafe impl Send for LinuxBackend {}
unsafe impl Sync for LinuxBackend {}

impl TpmBackend for LinuxBackend {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn submit_raw(&self, command: &[u8]) -> Result<Vec<u8>, TpmTransportFailure> {
        let fail = |reason: String| TpmTransportFailure { code: 0, platform: Platform::Linux, reason };

        let written = unsafe { libc::write(self.fd, command.as_ptr().cast(), command.len()) };
        if written < 0 || written as usize != command.len() {
            let errno = std::io::Error::last_os_error();
            return Err(fail(format!("writing TPM command: {errno}")));
        }

        let mut buf = vec![0u8; MAX_RESPONSE_LEN];
        let read = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        if read < 0 {
            let errno = std::io::Error::last_os_error();
            return Err(fail(format!("reading TPM response: {errno}")));
        }
        buf.truncate(read as usize);
        check_response_len(Platform::Linux, &buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_a_missing_device_fails_descriptively() {
        let err = LinuxBackend::open("/dev/this-tpm-does-not-exist-vc-tpm-test").unwrap_err();
        assert_eq!(err.platform, Platform::Linux);
        assert!(err.reason.contains("opening"));
    }

    #[test]
    fn opening_a_regular_file_is_rejected_as_non_character_device() {
        let dir = std::env::temp_dir();
        let path = dir.join("vc-tpm-regular-file-test");
        std::fs::write(&path, b"not a tpm").unwrap();
        let err = LinuxBackend::open(path.to_str().unwrap()).unwrap_err();
        assert!(err.reason.contains("non-character-device"));
        let _ = std::fs::remove_file(&path);
    }
}
