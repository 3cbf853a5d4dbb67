//! Self-signed HTTPS certificate creation.

use std::path::Path;

use tracing::{error, info};

use crate::domain::entities::{CertificateSubject, DEFAULT_KEY_BITS};
use crate::domain::errors::CertificateError;
use crate::domain::ports::CertificatePort;

/// Creates a self-signed certificate and its private key on disk.
///
/// Returns false and logs the cause if the crypto capability is missing or
/// any step fails.
pub fn create_https_certificates(
    backend: &dyn CertificatePort,
    cert_path: &Path,
    key_path: &Path,
) -> bool {
    match try_create(backend, cert_path, key_path) {
        Ok(()) => {
            info!(
                cert = %cert_path.display(),
                key = %key_path.display(),
                "Created self-signed certificate"
            );
            true
        }
        Err(e) => {
            error!(error = %e, "Error creating SSL key and certificate");
            false
        }
    }
}

fn try_create(
    backend: &dyn CertificatePort,
    cert_path: &Path,
    key_path: &Path,
) -> Result<(), CertificateError> {
    if !backend.is_available() {
        return Err(CertificateError::CapabilityMissing(
            "no crypto backend available to make a certificate".to_string(),
        ));
    }

    let key_pem = backend.generate_private_key(DEFAULT_KEY_BITS)?;
    let cert_pem = backend.self_signed_certificate(&key_pem, &CertificateSubject::default())?;

    write_pem(key_path, key_pem.as_bytes(), true)?;
    write_pem(cert_path, cert_pem.as_bytes(), false)
}

fn write_pem(path: &Path, contents: &[u8], private: bool) -> Result<(), CertificateError> {
    let wrap = |source| CertificateError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    std::fs::write(path, contents).map_err(wrap)?;
    if private {
        restrict_permissions(path).map_err(wrap)?;
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockCertificatePort;
    use crate::infrastructure::tls::RcgenCertificateBackend;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::traits::PublicKeyParts;
    use tempfile::TempDir;
    use x509_parser::extensions::GeneralName;
    use x509_parser::pem::parse_x509_pem;
    use x509_parser::public_key::PublicKey;
    use zeroize::Zeroizing;

    fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        &bytes[start..]
    }

    #[test]
    fn test_creates_parseable_certificate_for_written_key() {
        let dir = TempDir::new().unwrap();
        let cert = dir.path().join("ssl").join("htpc.crt");
        let key = dir.path().join("ssl").join("htpc.key");

        assert!(create_https_certificates(&RcgenCertificateBackend, &cert, &key));

        let key_pem = std::fs::read_to_string(&key).unwrap();
        let private = rsa::RsaPrivateKey::from_pkcs8_pem(&key_pem).unwrap();
        assert_eq!(private.size(), 256);

        let cert_bytes = std::fs::read(&cert).unwrap();
        let (_, pem) = parse_x509_pem(&cert_bytes).unwrap();
        assert_eq!(pem.label, "CERTIFICATE");
        let x509 = pem.parse_x509().unwrap();

        let common_name = |name: &x509_parser::x509::X509Name<'_>| {
            name.iter_common_name()
                .next()
                .and_then(|cn| cn.as_str().ok())
                .map(str::to_string)
        };
        assert_eq!(common_name(x509.subject()).as_deref(), Some("Htpc-Manager"));
        assert_eq!(common_name(x509.issuer()), common_name(x509.subject()));

        let san = x509.subject_alternative_name().unwrap().unwrap();
        assert!(
            san.value
                .general_names
                .iter()
                .any(|n| matches!(n, GeneralName::DNSName("localhost")))
        );
        assert!(
            san.value
                .general_names
                .iter()
                .any(|n| matches!(n, GeneralName::IPAddress(ip) if *ip == [127, 0, 0, 1]))
        );

        let not_before = x509.validity().not_before.to_datetime();
        let not_after = x509.validity().not_after.to_datetime();
        assert_eq!(not_after.year() - not_before.year(), 10);
        assert_eq!(not_after.month(), not_before.month());
        assert_eq!(not_after.day(), not_before.day());

        let PublicKey::RSA(public) = x509.public_key().parsed().unwrap() else {
            panic!("expected an RSA public key");
        };
        assert_eq!(
            strip_leading_zeros(public.modulus),
            private.n().to_bytes_be().as_slice()
        );
        assert_eq!(
            strip_leading_zeros(public.exponent),
            private.e().to_bytes_be().as_slice()
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&key).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_unavailable_backend_fails_without_writing() {
        let dir = TempDir::new().unwrap();
        let cert = dir.path().join("htpc.crt");
        let key = dir.path().join("htpc.key");

        let mut backend = MockCertificatePort::new();
        backend.expect_is_available().return_const(false);
        backend.expect_generate_private_key().never();

        assert!(!create_https_certificates(&backend, &cert, &key));
        assert!(!cert.exists());
        assert!(!key.exists());
    }

    #[test]
    fn test_signing_failure_fails() {
        let dir = TempDir::new().unwrap();
        let cert = dir.path().join("htpc.crt");
        let key = dir.path().join("htpc.key");

        let mut backend = MockCertificatePort::new();
        backend.expect_is_available().return_const(true);
        backend
            .expect_generate_private_key()
            .withf(|bits| *bits == 2048)
            .returning(|_| Ok(Zeroizing::new("KEY".to_string())));
        backend
            .expect_self_signed_certificate()
            .returning(|_, _| Err(CertificateError::certificate("boom")));

        assert!(!create_https_certificates(&backend, &cert, &key));
        assert!(!key.exists());
    }

    #[test]
    fn test_write_failure_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let mut backend = MockCertificatePort::new();
        backend.expect_is_available().return_const(true);
        backend
            .expect_generate_private_key()
            .returning(|_| Ok(Zeroizing::new("KEY".to_string())));
        backend
            .expect_self_signed_certificate()
            .withf(|key, subject| key.trim() == "KEY" && subject.common_name == "Htpc-Manager")
            .returning(|_, _| Ok("CERT".to_string()));

        let key = dir.path().join("htpc.key");
        let cert = blocker.join("htpc.crt");
        assert!(!create_https_certificates(&backend, &cert, &key));
        assert_eq!(std::fs::read_to_string(&key).unwrap(), "KEY");
    }
}
