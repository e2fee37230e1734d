use crate::core_error::FtpError;
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::net::Ipv4Addr;
use tokio::net::{TcpListener, TcpStream};

/// Leases ephemeral listening ports for passive-mode data transfers out of a
/// configured range. Candidate ports are tried in shuffled order so
/// concurrent sessions spread over the range; the OS bind is the arbiter of
/// availability.
pub struct PassivePortPool {
    start: u16,
    end: u16,
}

/// One bound, listening passive socket. Single-use: the session accepts one
/// data connection through it and releases it immediately afterwards, since
/// holding the listener longer risks exhausting the range under load.
pub struct PassiveLease {
    listener: Option<TcpListener>,
    port: u16,
}

impl PassiveLease {
    pub fn new(listener: TcpListener, port: u16) -> Self {
        Self {
            listener: Some(listener),
            port,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn accept(&self) -> std::io::Result<TcpStream> {
        match &self.listener {
            Some(listener) => {
                let (stream, addr) = listener.accept().await?;
                debug!("Accepted data connection from {} on port {}", addr, self.port);
                Ok(stream)
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "passive lease already released",
            )),
        }
    }

    /// Unbinds the listening socket. Safe to call more than once.
    pub fn release(&mut self) {
        if self.listener.take().is_some() {
            trace!("Released passive lease on port {}", self.port);
        }
    }
}

impl Drop for PassiveLease {
    fn drop(&mut self) {
        self.release();
    }
}

impl PassivePortPool {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }

    pub async fn lease(&self) -> Result<PassiveLease, FtpError> {
        let mut ports: Vec<u16> = (self.start..=self.end).collect();
        ports.shuffle(&mut thread_rng());

        for port in ports {
            match TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
                Ok(listener) => {
                    trace!("Leased passive port {}", port);
                    return Ok(PassiveLease::new(listener, port));
                }
                Err(_) => continue,
            }
        }
        Err(FtpError::ResourceExhausted)
    }
}
