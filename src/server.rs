use crate::config::Config;
use crate::core_auth::create_authenticator;
use crate::core_lock::PathLockManager;
use crate::core_network::network;
use crate::core_network::port_pool::PassivePortPool;
use crate::core_network::stream::ActiveTransfers;
use crate::core_storage::create_storage;
use crate::core_tls::CertificateProvider;
use crate::session::SessionDeps;
use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

/// Wires the collaborator set from the configuration and runs the FTP
/// server until shutdown.
pub async fn run(config: Config) -> Result<()> {
    config
        .tls
        .validate()
        .context("Invalid TLS configuration")?;
    log_config(&config);

    let banner = match &config.server.banner_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read banner file: {}", path))?,
        ),
        None => None,
    };

    let storage = create_storage(&config)?;
    let authenticator = create_authenticator(&config)?;
    let port_pool = Arc::new(PassivePortPool::new(
        config.server.pasv_port_start,
        config.server.pasv_port_end,
    ));
    let certificates = Arc::new(CertificateProvider::new(config.tls.clone()));

    let deps = SessionDeps {
        config: Arc::new(config),
        storage,
        authenticator,
        locks: Arc::new(PathLockManager::new()),
        port_pool: Some(port_pool),
        certificates,
        transfers: ActiveTransfers::new(),
    };

    network::start_server(deps, banner).await
}

fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  Max Sessions: {}", config.server.max_sessions);
    info!(
        "  Passive Port Range: {}-{}",
        config.server.pasv_port_start, config.server.pasv_port_end
    );
    info!("  Storage Backend: {}", config.server.storage_backend);
    info!("  Auth Backend: {}", config.server.auth_backend);
    info!("  TLS Enabled: {}", config.tls.enabled);
    if config.server.transfer_rate_limit > 0 {
        info!(
            "  Transfer Rate Limit: {} B/s",
            config.server.transfer_rate_limit
        );
    }
}
