use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::RwLock;
use vc_core::{Algorithm, MaterialSemantics, Purpose, VcError, VcResult};

use crate::pool::Pool;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Opaque context passed through to a signing/verification backend —
/// e.g. a TPM-backed function uses it to carry a handle path.
pub type Context = BTreeMap<String, String>;

/// The output of a `SigningFn`: raw signature bytes plus the algorithm that
/// produced them, so callers never have to re-derive it from context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub algorithm: Algorithm,
    pub bytes: Vec<u8>,
}

/// `(private_key_bytes, data_to_sign, pool, optional context) -> Signature`.
pub type SigningFn = Arc<
    dyn Fn(&[u8], &[u8], &Pool, Option<&Context>) -> BoxFuture<'static, VcResult<Signature>>
        + Send
        + Sync,
>;

/// `(data, signature, public_key_bytes, optional context) -> bool`.
///
/// A negative result is not an error — only malformed input, an unsupported
/// algorithm, or a backend failure is.
pub type VerificationFn = Arc<
    dyn Fn(&[u8], &[u8], &[u8], Option<&Context>) -> BoxFuture<'static, VcResult<bool>>
        + Send
        + Sync,
>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RegistryKey {
    algorithm: Algorithm,
    purpose: Purpose,
    material: Option<MaterialSemantics>,
}

#[derive(Clone)]
struct RegistryInner {
    signing: BTreeMap<RegistryKey, SigningFn>,
    verification: BTreeMap<RegistryKey, VerificationFn>,
}

static REGISTRY: RwLock<Option<RegistryInner>> = RwLock::new(None);

/// Builds a registry snapshot and installs it atomically. A second
/// `install()` call overwrites the previous snapshot without tearing —
/// readers always see either the old or the new state, never a mix.
#[derive(Default)]
pub struct RegistryBuilder {
    signing: BTreeMap<RegistryKey, SigningFn>,
    verification: BTreeMap<RegistryKey, VerificationFn>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_signing(
        mut self,
        algorithm: Algorithm,
        purpose: Purpose,
        material: Option<MaterialSemantics>,
        f: SigningFn,
    ) -> Self {
        self.signing.insert(RegistryKey { algorithm, purpose, material }, f);
        self
    }

    pub fn register_verification(
        mut self,
        algorithm: Algorithm,
        purpose: Purpose,
        material: Option<MaterialSemantics>,
        f: VerificationFn,
    ) -> Self {
        self.verification
            .insert(RegistryKey { algorithm, purpose, material }, f);
        self
    }

    pub fn install(self) {
        *REGISTRY.write() = Some(RegistryInner {
            signing: self.signing,
            verification: self.verification,
        });
    }
}

fn lookup<T: Clone>(
    table: impl Fn(&RegistryInner) -> &BTreeMap<RegistryKey, T>,
    algorithm: Algorithm,
    purpose: Purpose,
    material: Option<MaterialSemantics>,
) -> VcResult<T> {
    let guard = REGISTRY.read();
    let inner = guard.as_ref().ok_or(VcError::NotInitialized)?;
    table(inner)
        .get(&RegistryKey { algorithm, purpose, material })
        .cloned()
        .ok_or_else(|| {
            VcError::Unsupported(format!(
                "no function registered for {algorithm:?}/{purpose:?}/{material:?}"
            ))
        })
}

/// Resolve a signing function for `(algorithm, purpose, qualifier)`. Fails
/// with `NotInitialized` if no registry has been installed yet, or
/// `Unsupported` if nothing matches — a `TpmHandle` qualifier never falls
/// back to a `Direct` registration.
pub fn resolve_signing(
    algorithm: Algorithm,
    purpose: Purpose,
    material: Option<MaterialSemantics>,
) -> VcResult<SigningFn> {
    lookup(|r| &r.signing, algorithm, purpose, material)
}

pub fn resolve_verification(
    algorithm: Algorithm,
    purpose: Purpose,
    material: Option<MaterialSemantics>,
) -> VcResult<VerificationFn> {
    lookup(|r| &r.verification, algorithm, purpose, material)
}

/// Whether `install()` has been called at least once. Exposed for the demo
/// binary and tests; production code should rely on `resolve_*` errors
/// rather than polling this.
pub fn is_initialized() -> bool {
    REGISTRY.read().is_some()
}
