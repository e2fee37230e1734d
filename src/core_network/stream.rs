use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;

/// A connection that may have been upgraded to TLS. Used for both the
/// control channel (after AUTH TLS) and PROT P data channels.
pub enum SecurableStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl SecurableStream {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        match self {
            SecurableStream::Plain(stream) => stream.local_addr(),
            SecurableStream::Tls(stream) => stream.get_ref().0.local_addr(),
        }
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self {
            SecurableStream::Plain(stream) => stream.peer_addr(),
            SecurableStream::Tls(stream) => stream.get_ref().0.peer_addr(),
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, SecurableStream::Tls(_))
    }
}

impl AsyncRead for SecurableStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            SecurableStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            SecurableStream::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for SecurableStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            SecurableStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            SecurableStream::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            SecurableStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            SecurableStream::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            SecurableStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            SecurableStream::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// Shared counter of data connections currently open, kept for log lines.
#[derive(Clone, Default)]
pub struct ActiveTransfers {
    count: Arc<AtomicUsize>,
}

impl ActiveTransfers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn begin(&self) -> TransferGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        TransferGuard {
            count: Arc::clone(&self.count),
        }
    }
}

struct TransferGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for TransferGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One negotiated data connection. Closing (or dropping) it signals
/// completion to the active-transfer counter.
pub struct DataStream {
    stream: SecurableStream,
    _guard: TransferGuard,
}

impl DataStream {
    pub fn new(stream: SecurableStream, transfers: &ActiveTransfers) -> Self {
        Self {
            stream,
            _guard: transfers.begin(),
        }
    }
}

impl AsyncRead for DataStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for DataStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().stream).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_shutdown(cx)
    }
}
