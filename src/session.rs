use crate::config::Config;
use crate::core_auth::Authenticator;
use crate::core_error::FtpError;
use crate::core_lock::PathLockManager;
use crate::core_network::port_pool::{PassiveLease, PassivePortPool};
use crate::core_network::stream::{ActiveTransfers, DataStream, SecurableStream};
use crate::core_storage::StorageBackend;
use crate::core_tls::{CertificateProvider, TlsError};
use crate::core_transfer::RateLimiter;
use log::{debug, info, trace};
use rand::Rng;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Binary,
    Ascii,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataProtection {
    Clear,
    Private,
}

/// Everything one control connection owns. The session lives on its
/// connection's task and is handed to handlers as `&mut`; nothing in here is
/// shared between sessions except the collaborator handles.
pub struct Session {
    pub id: String,
    /// Current logical directory; absolute, no trailing separator except "/".
    pub cwd: String,
    pub transfer_type: TransferType,
    pub is_authenticated: bool,
    pub pending_user: Option<String>,
    /// Set by RNFR, consumed by RNTO.
    pub rename_from: Option<String>,
    /// Set by REST, consumed by the next RETR/STOR/APPE.
    pub restart_offset: u64,
    /// Client endpoint from PORT/EPRT; consumed on use.
    pub active_endpoint: Option<SocketAddr>,
    /// At most one outstanding passive listener per session.
    pub passive_lease: Option<PassiveLease>,
    pub is_control_tls: bool,
    /// Set by AUTH TLS; the control loop performs the swap after the 234
    /// reply has gone out.
    pub upgrade_requested: bool,
    pub data_protection: DataProtection,
    pub should_quit: bool,

    control: Option<BufStream<SecurableStream>>,
    peer_addr: SocketAddr,
    local_addr: SocketAddr,

    pub config: Arc<Config>,
    pub storage: Arc<dyn StorageBackend>,
    pub authenticator: Arc<dyn Authenticator>,
    pub locks: Arc<PathLockManager>,
    pub port_pool: Option<Arc<PassivePortPool>>,
    pub certificates: Arc<CertificateProvider>,
    pub transfers: ActiveTransfers,
}

#[derive(Clone)]
pub struct SessionDeps {
    pub config: Arc<Config>,
    pub storage: Arc<dyn StorageBackend>,
    pub authenticator: Arc<dyn Authenticator>,
    pub locks: Arc<PathLockManager>,
    pub port_pool: Option<Arc<PassivePortPool>>,
    pub certificates: Arc<CertificateProvider>,
    pub transfers: ActiveTransfers,
}

impl Session {
    pub fn new(stream: SecurableStream, deps: SessionDeps) -> std::io::Result<Self> {
        let peer_addr = stream.peer_addr()?;
        let local_addr = stream.local_addr()?;
        let is_control_tls = stream.is_tls();
        let id = format!("{:08x}", rand::thread_rng().gen::<u32>());

        Ok(Self {
            id,
            cwd: String::from("/"),
            transfer_type: TransferType::Binary,
            is_authenticated: false,
            pending_user: None,
            rename_from: None,
            restart_offset: 0,
            active_endpoint: None,
            passive_lease: None,
            is_control_tls,
            upgrade_requested: false,
            data_protection: DataProtection::Clear,
            should_quit: false,
            control: Some(BufStream::new(stream)),
            peer_addr,
            local_addr,
            config: deps.config,
            storage: deps.storage,
            authenticator: deps.authenticator,
            locks: deps.locks,
            port_pool: deps.port_pool,
            certificates: deps.certificates,
            transfers: deps.transfers,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    fn control_mut(&mut self) -> std::io::Result<&mut BufStream<SecurableStream>> {
        self.control.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "control stream closed")
        })
    }

    /// Writes one CRLF-terminated reply line and flushes it.
    pub async fn send_response(&mut self, line: &str) -> std::io::Result<()> {
        trace!("[{}] >> {}", self.id, line);
        let control = self.control_mut()?;
        control.write_all(line.as_bytes()).await?;
        control.write_all(b"\r\n").await?;
        control.flush().await?;
        Ok(())
    }

    /// Reads one command line, bounded by the configured idle timeout.
    /// Returns `None` on end-of-stream.
    pub async fn read_command_line(&mut self) -> Result<Option<String>, FtpError> {
        let idle_secs = self.config.server.idle_timeout_secs;
        let control = self.control_mut()?;
        let mut line = String::new();

        let n = if idle_secs > 0 {
            timeout(Duration::from_secs(idle_secs), control.read_line(&mut line)).await??
        } else {
            control.read_line(&mut line).await?
        };
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// Maps a command argument onto an absolute logical path. Empty
    /// arguments name the current directory; absolute arguments are taken
    /// as-is; relative ones are joined onto `cwd`.
    pub fn resolve_path(&self, arg: &str) -> String {
        let arg = arg.trim();
        let resolved = if arg.is_empty() {
            self.cwd.clone()
        } else if arg.starts_with('/') {
            arg.to_string()
        } else if self.cwd == "/" {
            format!("/{}", arg)
        } else {
            format!("{}/{}", self.cwd, arg)
        };

        let trimmed = resolved.trim_end_matches('/');
        if trimmed.is_empty() {
            String::from("/")
        } else {
            trimmed.to_string()
        }
    }

    /// REST offsets apply to exactly one following transfer command.
    pub fn take_restart_offset(&mut self) -> u64 {
        std::mem::take(&mut self.restart_offset)
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.config.server.transfer_rate_limit)
    }

    /// Tears down any previous passive lease, obtains a fresh one and
    /// returns the (advertised IP, port) pair for the PASV/EPSV reply.
    pub async fn enter_passive_mode(&mut self) -> Result<(Ipv4Addr, u16), FtpError> {
        if let Some(mut old) = self.passive_lease.take() {
            old.release();
        }

        let lease = match &self.port_pool {
            Some(pool) => pool.lease().await?,
            None => self.scan_port_range().await?,
        };
        let port = lease.port();
        debug!("[{}] Passive lease on port {}", self.id, port);
        self.passive_lease = Some(lease);
        Ok((self.advertised_ip(), port))
    }

    /// Fallback when no pool is wired: walk the configured range and bind
    /// the first free port directly.
    async fn scan_port_range(&self) -> Result<PassiveLease, FtpError> {
        let start = self.config.server.pasv_port_start;
        let end = self.config.server.pasv_port_end;
        for port in start..=end {
            if let Ok(listener) = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
                return Ok(PassiveLease::new(listener, port));
            }
        }
        Err(FtpError::ResourceExhausted)
    }

    /// Address to advertise in PASV replies: explicit override, then the
    /// non-wildcard listen address, then the control socket's local address,
    /// then loopback.
    fn advertised_ip(&self) -> Ipv4Addr {
        if let Some(addr) = &self.config.server.pasv_address {
            if let Ok(ip) = addr.parse::<Ipv4Addr>() {
                return ip;
            }
        }
        if let Ok(ip) = self.config.server.listen_address.parse::<Ipv4Addr>() {
            if !ip.is_unspecified() {
                return ip;
            }
        }
        if let IpAddr::V4(ip) = self.local_addr.ip() {
            if !ip.is_unspecified() {
                return ip;
            }
        }
        Ipv4Addr::LOCALHOST
    }

    /// Establishes the data connection negotiated by the preceding
    /// PASV/EPSV or PORT/EPRT, wrapping it in TLS when PROT P is active.
    pub async fn open_data_stream(&mut self) -> Result<DataStream, FtpError> {
        let open_timeout = Duration::from_secs(self.config.server.data_open_timeout_secs);

        let tcp = if let Some(mut lease) = self.passive_lease.take() {
            let accepted = timeout(open_timeout, lease.accept()).await?;
            // Single-use: unbind as soon as one connection came through.
            lease.release();
            accepted.map_err(|e| FtpError::DataConnection(e.to_string()))?
        } else if let Some(addr) = self.active_endpoint.take() {
            timeout(open_timeout, TcpStream::connect(addr))
                .await?
                .map_err(|e| FtpError::DataConnection(e.to_string()))?
        } else {
            return Err(FtpError::DataConnection(
                "no passive lease or active endpoint negotiated".to_string(),
            ));
        };

        let stream = if self.data_protection == DataProtection::Private {
            let acceptor = self.certificates.acceptor().await?;
            let tls = acceptor
                .accept(tcp)
                .await
                .map_err(|e| FtpError::DataConnection(e.to_string()))?;
            SecurableStream::Tls(Box::new(tls))
        } else {
            SecurableStream::Plain(tcp)
        };

        Ok(DataStream::new(stream, &self.transfers))
    }

    /// Swaps the control reader/writer for TLS-wrapped ones. Called by the
    /// control loop right after the plaintext 234 reply was flushed.
    pub async fn upgrade_control_tls(&mut self) -> Result<(), FtpError> {
        let acceptor = self.certificates.acceptor().await?;
        let control = self.control.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "control stream closed")
        })?;

        match control.into_inner() {
            SecurableStream::Plain(tcp) => {
                let tls = acceptor
                    .accept(tcp)
                    .await
                    .map_err(|e| TlsError::TlsHandshakeError(e.to_string()))?;
                self.control = Some(BufStream::new(SecurableStream::Tls(Box::new(tls))));
                self.is_control_tls = true;
                info!("[{}] Control channel upgraded to TLS", self.id);
                Ok(())
            }
            already => {
                self.control = Some(BufStream::new(already));
                Ok(())
            }
        }
    }

    /// Drops whatever the session still holds; called on every exit path.
    pub fn release_resources(&mut self) {
        if let Some(mut lease) = self.passive_lease.take() {
            lease.release();
        }
        self.active_endpoint = None;
    }
}
