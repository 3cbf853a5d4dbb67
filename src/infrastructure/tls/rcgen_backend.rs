//! Self-signed certificates with `rsa` keys and `rcgen` signing.

use chrono::{Datelike, Utc};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, PKCS_RSA_SHA256};
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::entities::CertificateSubject;
use crate::domain::errors::CertificateError;
use crate::domain::ports::CertificatePort;

/// Local crypto backend; always available in this build.
#[derive(Debug, Clone, Copy, Default)]
pub struct RcgenCertificateBackend;

impl CertificatePort for RcgenCertificateBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn generate_private_key(&self, bits: usize) -> Result<Zeroizing<String>, CertificateError> {
        debug!(bits, "Generating RSA private key");
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), bits)
            .map_err(|e| CertificateError::key(e.to_string()))?;
        key.to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CertificateError::key(e.to_string()))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn self_signed_certificate(
        &self,
        key_pem: &str,
        subject: &CertificateSubject,
    ) -> Result<String, CertificateError> {
        let key_pair = KeyPair::from_pem_and_sign_algo(key_pem, &PKCS_RSA_SHA256)
            .map_err(|e| CertificateError::certificate(format!("unusable key: {e}")))?;

        let mut params = CertificateParams::new(subject.alt_names.clone())
            .map_err(|e| CertificateError::certificate(e.to_string()))?;

        let mut name = DistinguishedName::new();
        name.push(DnType::CommonName, subject.common_name.as_str());
        params.distinguished_name = name;

        let today = Utc::now().date_naive();
        // Day 28 exists in every month, so the end date is always valid.
        let (month, day) = (today.month() as u8, today.day().min(28) as u8);
        params.not_before = rcgen::date_time_ymd(today.year(), month, day);
        params.not_after = rcgen::date_time_ymd(today.year() + subject.validity_years, month, day);

        let cert = params
            .self_signed(&key_pair)
            .map_err(|e| CertificateError::certificate(e.to_string()))?;

        debug!(common_name = %subject.common_name, "Signed self-signed certificate");
        Ok(cert.pem())
    }
}
