//! Port for the optional crypto capability.

use zeroize::Zeroizing;

use crate::domain::entities::CertificateSubject;
use crate::domain::errors::CertificateError;

/// Generates key pairs and self-signed certificates.
#[cfg_attr(test, mockall::automock)]
pub trait CertificatePort: Send + Sync {
    /// Returns false when no crypto backend is usable.
    fn is_available(&self) -> bool;

    /// Generates an RSA private key and returns it as PKCS#8 PEM.
    ///
    /// # Errors
    /// Returns error if key generation or encoding fails.
    fn generate_private_key(&self, bits: usize) -> Result<Zeroizing<String>, CertificateError>;

    /// Builds a certificate for `subject` signed by `key_pem` itself and
    /// returns it as PEM.
    ///
    /// # Errors
    /// Returns error if the key cannot be loaded or signing fails.
    fn self_signed_certificate(
        &self,
        key_pem: &str,
        subject: &CertificateSubject,
    ) -> Result<String, CertificateError>;
}
