use crate::core_tls::error::TlsError;
use crate::core_tls::tls_config::TlsConfig;
use log::{info, warn};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::fs;
use std::io::BufReader;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_rustls::TlsAcceptor;

/// Loads or generates the server's TLS identity and hands out the acceptor
/// used for both the control-channel upgrade (AUTH TLS) and PROT P data
/// channels. The identity is built once and reused for the process lifetime.
pub struct CertificateProvider {
    config: TlsConfig,
    acceptor: OnceCell<TlsAcceptor>,
}

impl CertificateProvider {
    pub fn new(config: TlsConfig) -> Self {
        Self {
            config,
            acceptor: OnceCell::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Returns the cached acceptor, building it on first use.
    pub async fn acceptor(&self) -> Result<TlsAcceptor, TlsError> {
        if !self.config.enabled {
            return Err(TlsError::TlsNotConfigured);
        }
        let acceptor = self
            .acceptor
            .get_or_try_init(|| async { self.build_acceptor() })
            .await?;
        Ok(acceptor.clone())
    }

    fn build_acceptor(&self) -> Result<TlsAcceptor, TlsError> {
        let (certs, key) =
            if self.config.cert_file.exists() && self.config.key_file.exists() {
                info!(
                    "Loading TLS certificate from {:?}",
                    self.config.cert_file
                );
                self.load_pem_identity()?
            } else if self.config.self_signed {
                warn!("No certificate on disk, generating a self-signed TLS identity");
                generate_self_signed()?
            } else {
                return Err(TlsError::CertificateLoadError(format!(
                    "Certificate file not found: {:?}",
                    self.config.cert_file
                )));
            };

        let tls_config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| TlsError::TlsConfigError(e.to_string()))?;

        Ok(TlsAcceptor::from(Arc::new(tls_config)))
    }

    fn load_pem_identity(
        &self,
    ) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), TlsError> {
        let cert_file = fs::File::open(&self.config.cert_file)
            .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
        let mut reader = BufReader::new(cert_file);
        let certs = rustls_pemfile::certs(&mut reader)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
        if certs.is_empty() {
            return Err(TlsError::CertificateLoadError(
                "No certificates found in PEM file".to_string(),
            ));
        }

        let key_file = fs::File::open(&self.config.key_file)
            .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
        let mut reader = BufReader::new(key_file);
        let mut keys = rustls_pemfile::pkcs8_private_keys(&mut reader)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;

        let key = match keys.pop() {
            Some(k) => PrivateKeyDer::from(k),
            None => {
                // PKCS#1 fallback for older key files.
                let key_file = fs::File::open(&self.config.key_file)
                    .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
                let mut reader = BufReader::new(key_file);
                let mut rsa_keys = rustls_pemfile::rsa_private_keys(&mut reader)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
                match rsa_keys.pop() {
                    Some(k) => PrivateKeyDer::from(k),
                    None => {
                        return Err(TlsError::PrivateKeyLoadError(
                            "No private key found".to_string(),
                        ))
                    }
                }
            }
        };

        Ok((certs, key))
    }
}

fn generate_self_signed(
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), TlsError> {
    let cert = rcgen::generate_simple_self_signed(vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
    ])
    .map_err(|e| TlsError::CertificateGenerationError(e.to_string()))?;

    let cert_der = cert
        .serialize_der()
        .map_err(|e| TlsError::CertificateGenerationError(e.to_string()))?;
    let key_der = cert.serialize_private_key_der();

    Ok((
        vec![CertificateDer::from(cert_der)],
        PrivateKeyDer::from(PrivatePkcs8KeyDer::from(key_der)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_config() -> TlsConfig {
        TlsConfig {
            enabled: true,
            self_signed: true,
            cert_file: "does/not/exist.pem".into(),
            key_file: "does/not/exist.key".into(),
            ..TlsConfig::default()
        }
    }

    #[tokio::test]
    async fn disabled_provider_refuses() {
        let provider = CertificateProvider::new(TlsConfig::default());
        assert!(matches!(
            provider.acceptor().await,
            Err(TlsError::TlsNotConfigured)
        ));
    }

    #[tokio::test]
    async fn self_signed_identity_is_generated_and_cached() {
        let provider = CertificateProvider::new(enabled_config());
        provider.acceptor().await.unwrap();
        // Second call must hit the cache rather than regenerating.
        provider.acceptor().await.unwrap();
        assert!(provider.acceptor.initialized());
    }

    #[tokio::test]
    async fn missing_certificate_without_self_signed_fails() {
        let config = TlsConfig {
            enabled: true,
            self_signed: false,
            cert_file: "does/not/exist.pem".into(),
            key_file: "does/not/exist.key".into(),
            ..TlsConfig::default()
        };
        let provider = CertificateProvider::new(config);
        assert!(matches!(
            provider.acceptor().await,
            Err(TlsError::CertificateLoadError(_))
        ));
    }
}
