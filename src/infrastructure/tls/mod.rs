//! TLS certificate generation.

pub mod rcgen_backend;

pub use rcgen_backend::RcgenCertificateBackend;
