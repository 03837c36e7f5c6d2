//! vc-cli — a demo binary exercising the crypto substrate end to end.
//!
//! Runs through, in order: registry bootstrap, a CBOR/COSE round-trip, an
//! SD-CWT disclosure round-trip, a submit against the virtual TPM backend,
//! and a sample claim-issue/assess run. Nothing here is a server — there is
//! no listening socket, no persisted state; it exists to prove the crates
//! compose the way the rest of this workspace assumes they do.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use vc_core::{Algorithm, FixedTimeProvider, MaterialSemantics, Purpose};
use vc_cose::{ClaimsBuilder, CoseSign1, HeaderMap};
use vc_crypto::{software, KeyFactory, Pool};
use vc_sdcwt::Disclosure;
use vc_tpm::TpmDevice;

#[derive(Parser, Debug)]
#[command(name = "vc-cli", version, about = "Verifiable-credentials crypto substrate demo")]
struct Args {
    /// Subject identifier embedded in the demo CWT claims.
    #[arg(long, default_value = "demo-subject")]
    subject: String,

    /// Skip the TPM submit step (useful where a virtual backend isn't enough context).
    #[arg(long, default_value_t = false)]
    skip_tpm: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let pool = Pool;

    bootstrap_registry();
    let (private, public) = issue_keypair();

    let sign1 = cose_round_trip(&args.subject, &private, &public, &pool).await?;
    info!(payload_len = sign1.payload.len(), "COSE_Sign1 round-trip verified");

    sd_cwt_round_trip()?;

    if !args.skip_tpm {
        tpm_round_trip()?;
    }

    assessment_round_trip().await;

    info!("demo run complete");
    Ok(())
}

/// Install the default software registry (ES256 under `MaterialSemantics::Direct`).
/// A real deployment would also register a TPM-backed or HSM-backed entry
/// under a different material qualifier before touching production keys.
fn bootstrap_registry() {
    software::default_registry_builder().install();
    info!("crypto function registry installed");
}

fn issue_keypair() -> (vc_crypto::PrivateKey, vc_crypto::PublicKey) {
    let (sk_bytes, pk_bytes) = software::generate_es256_keypair();
    let private = KeyFactory::private_key(sk_bytes, Algorithm::Es256, Purpose::Signing, MaterialSemantics::Direct);
    let public = KeyFactory::public_key(pk_bytes, Algorithm::Es256, Purpose::Signing, MaterialSemantics::Direct);
    (private, public)
}

async fn cose_round_trip(
    subject: &str,
    private: &vc_crypto::PrivateKey,
    public: &vc_crypto::PublicKey,
    pool: &Pool,
) -> anyhow::Result<CoseSign1> {
    let claims = ClaimsBuilder::new().sub(subject).iat(1_700_000_000).build();
    let payload = vc_cose::encode_claims(&claims);

    let protected = HeaderMap::with_algorithm(Algorithm::Es256);
    let sign1 = CoseSign1::sign(payload, protected, HeaderMap::new(), private, pool)
        .await
        .context("signing COSE_Sign1")?;

    let bytes = sign1.to_bytes();
    let decoded = CoseSign1::from_bytes(&bytes).context("decoding COSE_Sign1")?;
    let verified = decoded.verify(public).await.context("verifying COSE_Sign1")?;
    anyhow::ensure!(verified, "COSE_Sign1 signature did not verify");
    Ok(decoded)
}

fn sd_cwt_round_trip() -> anyhow::Result<()> {
    let disclosure = Disclosure::property(b"salt-demo-0001".to_vec(), "birth_date", "1990-01-01".into());
    let encoded = disclosure.encode();
    let decoded = Disclosure::decode(&encoded).context("decoding disclosure")?;
    anyhow::ensure!(decoded.name.as_deref() == Some("birth_date"));
    info!(digest = %hex::encode(disclosure.digest(vc_core::DigestAlgorithm::Sha256)), "SD-CWT disclosure round-trip verified");
    Ok(())
}

fn tpm_round_trip() -> anyhow::Result<()> {
    // A real deployment opens `TpmDevice::open_linux()`/`open_windows()`;
    // the demo uses a virtual backend so it runs anywhere.
    let device = TpmDevice::virtual_device(|_command| {
        let mut response = vec![0x80, 0x01, 0, 0, 0, 10, 0, 0, 0, 0];
        response[6..10].copy_from_slice(&0u32.to_be_bytes());
        Ok(response)
    });
    let _sub = device.subscribe(Arc::new(|exchange: &vc_tpm::TpmExchange| {
        info!(command_len = exchange.command.len(), response_len = exchange.response.len(), "TPM exchange observed");
    }));

    let pool = Pool;
    let result = device.submit(b"demo-command", &pool);
    anyhow::ensure!(result.is_success(), "virtual TPM submit did not succeed");
    Ok(())
}

async fn assessment_round_trip() {
    use vc_assess::{ClaimIssuer, ClaimRule, FixedIdGenerator, SimpleAssessor, TraceContext};

    let time = Arc::new(FixedTimeProvider(1_700_000_000));
    let issuer = ClaimIssuer::new("demo-issuer", Arc::new(FixedIdGenerator("claim-1".into())), time.clone())
        .with_rule(ClaimRule::new(
            "non_empty_subject",
            Arc::new(|subject: &String, _cancel| {
                if subject.is_empty() {
                    Ok(vec![vc_assess::Claim::failure("non_empty_subject", "subject is empty")])
                } else {
                    Ok(vec![vc_assess::Claim::success("non_empty_subject")])
                }
            }),
        ));

    let trace = TraceContext::root();
    let claim_result = issuer.generate_claims(
        &"demo-subject".to_string(),
        "demo-correlation",
        &tokio_util::sync::CancellationToken::new(),
        &trace,
    );

    let assessor = SimpleAssessor::new("demo-assessor", Arc::new(FixedIdGenerator("assess-1".into())), time);
    let assessment = assessor.assess(&claim_result, &trace);
    info!(success = assessment.success, "sample assessment run complete");
}
