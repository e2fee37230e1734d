pub mod certificate;
pub mod error;
pub mod tls_config;

pub use certificate::CertificateProvider;
pub use error::TlsError;
pub use tls_config::TlsConfig;
