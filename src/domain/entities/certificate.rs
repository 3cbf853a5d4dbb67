//! Certificate request types.

/// Common name used for the generated server certificate.
pub const DEFAULT_COMMON_NAME: &str = "Htpc-Manager";

/// RSA modulus size for generated keys.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Validity of a generated certificate in years.
pub const DEFAULT_VALIDITY_YEARS: i32 = 10;

/// Subject and validity of a self-signed certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSubject {
    /// Subject common name.
    pub common_name: String,
    /// DNS names and IP addresses for the subject alternative name extension.
    pub alt_names: Vec<String>,
    /// Validity period in years, starting today.
    pub validity_years: i32,
}

impl Default for CertificateSubject {
    fn default() -> Self {
        Self {
            common_name: DEFAULT_COMMON_NAME.to_string(),
            alt_names: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            validity_years: DEFAULT_VALIDITY_YEARS,
        }
    }
}
