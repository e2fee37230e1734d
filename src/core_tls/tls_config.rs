use crate::core_tls::error::TlsError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Whether AUTH TLS (and PROT P data channels) are offered at all.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_cert_file")]
    pub cert_file: PathBuf,

    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,

    /// Generate a throwaway self-signed certificate when the configured
    /// cert/key files are absent.
    #[serde(default)]
    pub self_signed: bool,

    /// Implicit FTPS: wrap connections on `implicit_tls_port` before the
    /// greeting instead of waiting for AUTH TLS.
    #[serde(default)]
    pub implicit_tls: bool,

    #[serde(default = "default_implicit_tls_port")]
    pub implicit_tls_port: u16,
}

fn default_cert_file() -> PathBuf {
    PathBuf::from("etc/ssl/cert.pem")
}

fn default_key_file() -> PathBuf {
    PathBuf::from("etc/ssl/key.pem")
}

fn default_implicit_tls_port() -> u16 {
    990
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cert_file: default_cert_file(),
            key_file: default_key_file(),
            self_signed: false,
            implicit_tls: false,
            implicit_tls_port: default_implicit_tls_port(),
        }
    }
}

impl TlsConfig {
    pub fn validate(&self) -> Result<(), TlsError> {
        if self.enabled && !self.self_signed {
            if !self.cert_file.exists() {
                return Err(TlsError::CertificateLoadError(format!(
                    "Certificate file not found: {:?}",
                    self.cert_file
                )));
            }

            if !self.key_file.exists() {
                return Err(TlsError::PrivateKeyLoadError(format!(
                    "Private key file not found: {:?}",
                    self.key_file
                )));
            }
        }

        Ok(())
    }
}
