use crate::constants::{
    DATA_BUFFER_SIZE, LIST_GROUP, LIST_OWNER, LIST_PERMS_DIR, LIST_PERMS_FILE,
};
use crate::core_error::FtpError;
use crate::core_storage::{StorageEntry, WriteMode};
use crate::session::{Session, TransferType};
use chrono::Local;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;

/// Renders one Unix-style LIST line. Permission bits, link count and
/// owner/group are synthetic; only the directory flag, size and name come
/// from the backend.
pub fn format_list_line(entry: &StorageEntry) -> String {
    let perms = if entry.is_dir {
        LIST_PERMS_DIR
    } else {
        LIST_PERMS_FILE
    };
    let size = entry.size.unwrap_or(0);
    let timestamp = Local::now().format("%b %d %H:%M");
    format!(
        "{} {:>3} {:<5} {:<5} {:>8} {} {}",
        perms, 1, LIST_OWNER, LIST_GROUP, size, timestamp, entry.name
    )
}

/// Quotes a path for 257 replies, doubling embedded quotes.
pub fn quote_path(path: &str) -> String {
    format!("\"{}\"", path.replace('"', "\"\""))
}

/// Rewrites stored LF line endings to CRLF for ASCII-mode downloads.
/// Stateful so a CRLF split across chunk boundaries is not doubled.
#[derive(Default)]
pub struct AsciiEncoder {
    last_was_cr: bool,
}

impl AsciiEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, chunk: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(chunk.len() + chunk.len() / 8);
        for &byte in chunk {
            if byte == b'\n' && !self.last_was_cr {
                out.push(b'\r');
            }
            out.push(byte);
            self.last_was_cr = byte == b'\r';
        }
        out
    }
}

/// Normalizes CRLF line endings to LF for ASCII-mode uploads. A CR held at
/// a chunk boundary is resolved by the next chunk or flushed at the end.
#[derive(Default)]
pub struct AsciiDecoder {
    pending_cr: bool,
}

impl AsciiDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(chunk.len());
        for &byte in chunk {
            if self.pending_cr {
                self.pending_cr = false;
                if byte != b'\n' {
                    out.push(b'\r');
                }
            }
            if byte == b'\r' {
                self.pending_cr = true;
            } else {
                out.push(byte);
            }
        }
        out
    }

    pub fn finish(&mut self) -> Vec<u8> {
        if std::mem::take(&mut self.pending_cr) {
            vec![b'\r']
        } else {
            Vec::new()
        }
    }
}

/// Shared upload path for STOR and APPE: reads the data connection, applies
/// ASCII normalization and the rate ceiling, and pumps the bytes into the
/// storage backend under an exclusive path lock.
pub(crate) async fn receive_into_storage(
    session: &mut Session,
    path: &str,
    mode: WriteMode,
) -> Result<(), FtpError> {
    session
        .send_response("150 Opening data connection.")
        .await?;

    let mut data = match session.open_data_stream().await {
        Ok(stream) => stream,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!("[{}] Data connection failed: {}", session.id, e);
            session
                .send_response("425 Can't open data connection.")
                .await?;
            return Ok(());
        }
    };

    let ascii = session.transfer_type == TransferType::Ascii;
    let mut limiter = session.rate_limiter();
    let transfer_timeout = session.config.server.transfer_timeout_secs;
    let storage = Arc::clone(&session.storage);
    let guard = session.locks.acquire_write(path).await;

    let (mut tx, mut rx) = tokio::io::duplex(DATA_BUFFER_SIZE);
    let write_task = tokio::spawn({
        let path = path.to_string();
        async move { storage.write(&path, &mut rx, mode).await }
    });

    let pump = async {
        let mut decoder = AsciiDecoder::new();
        let mut buffer = vec![0u8; DATA_BUFFER_SIZE];
        loop {
            let n = data.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            if ascii {
                tx.write_all(&decoder.decode(&buffer[..n])).await?;
            } else {
                tx.write_all(&buffer[..n]).await?;
            }
            limiter.throttle(n).await;
        }
        if ascii {
            let tail = decoder.finish();
            if !tail.is_empty() {
                tx.write_all(&tail).await?;
            }
        }
        tx.shutdown().await?;
        Ok::<(), std::io::Error>(())
    };

    let pump_result = if transfer_timeout > 0 {
        match timeout(Duration::from_secs(transfer_timeout), pump).await {
            Ok(result) => result,
            Err(_) => {
                write_task.abort();
                drop(guard);
                return Err(FtpError::Timeout);
            }
        }
    } else {
        pump.await
    };

    let write_result = write_task.await.map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, format!("storage task: {}", e))
    })?;
    drop(guard);

    match (pump_result, write_result) {
        (Ok(()), Ok(written)) => {
            info!("[{}] Stored {} bytes at {}", session.id, written, path);
            session.send_response("226 Transfer complete.").await?;
        }
        (Err(e), _) => {
            warn!("[{}] Upload to {} aborted: {}", session.id, path, e);
            session
                .send_response("425 Data connection failed; transfer aborted.")
                .await?;
        }
        (_, Err(e)) => {
            warn!("[{}] Storage write to {} failed: {}", session.id, path, e);
            session
                .send_response("550 Failed to store file.")
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_line_layout_for_files_and_directories() {
        let file = StorageEntry {
            name: "file1.txt".to_string(),
            path: "/file1.txt".to_string(),
            is_dir: false,
            size: Some(2134),
        };
        let line = format_list_line(&file);
        assert!(line.starts_with("-rwxr-xr-x   1 owner group     2134 "));
        assert!(line.ends_with(" file1.txt"));

        let dir = StorageEntry {
            name: "sub".to_string(),
            path: "/sub".to_string(),
            is_dir: true,
            size: None,
        };
        assert!(format_list_line(&dir).starts_with("drwxr-xr-x"));
    }

    #[test]
    fn quoted_paths_double_embedded_quotes() {
        assert_eq!(quote_path("/plain"), "\"/plain\"");
        assert_eq!(quote_path("/a\"b"), "\"/a\"\"b\"");
    }

    #[test]
    fn encoder_expands_lf_to_crlf() {
        let mut encoder = AsciiEncoder::new();
        assert_eq!(encoder.encode(b"a\nb\n"), b"a\r\nb\r\n");
    }

    #[test]
    fn encoder_leaves_existing_crlf_alone() {
        let mut encoder = AsciiEncoder::new();
        assert_eq!(encoder.encode(b"a\r\nb"), b"a\r\nb");
    }

    #[test]
    fn encoder_handles_crlf_split_across_chunks() {
        let mut encoder = AsciiEncoder::new();
        let mut out = encoder.encode(b"a\r");
        out.extend(encoder.encode(b"\nb"));
        assert_eq!(out, b"a\r\nb");
    }

    #[test]
    fn decoder_normalizes_crlf_to_lf() {
        let mut decoder = AsciiDecoder::new();
        let mut out = decoder.decode(b"a\r\nb\r\n");
        out.extend(decoder.finish());
        assert_eq!(out, b"a\nb\n");
    }

    #[test]
    fn decoder_keeps_bare_cr() {
        let mut decoder = AsciiDecoder::new();
        let mut out = decoder.decode(b"a\rb");
        out.extend(decoder.finish());
        assert_eq!(out, b"a\rb");
    }

    #[test]
    fn decoder_handles_crlf_split_across_chunks() {
        let mut decoder = AsciiDecoder::new();
        let mut out = decoder.decode(b"a\r");
        out.extend(decoder.decode(b"\nb"));
        out.extend(decoder.finish());
        assert_eq!(out, b"a\nb");
    }

    #[test]
    fn decoder_flushes_trailing_cr() {
        let mut decoder = AsciiDecoder::new();
        let mut out = decoder.decode(b"abc\r");
        out.extend(decoder.finish());
        assert_eq!(out, b"abc\r");
    }
}
