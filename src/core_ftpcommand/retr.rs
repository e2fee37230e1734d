use crate::constants::DATA_BUFFER_SIZE;
use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::AsciiEncoder;
use crate::session::{Session, TransferType};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;

/// Handles the RETR (Retrieve) FTP command.
///
/// Streams the file over the negotiated data connection, honoring a pending
/// restart offset, the session transfer type and the configured rate
/// ceiling. The path is read-locked for the duration of the transfer.
pub async fn handle_retr_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    if arg.trim().is_empty() {
        warn!("[{}] RETR command received with no arguments", session.id);
        session
            .send_response("501 Syntax error in parameters or arguments.")
            .await?;
        return Ok(());
    }

    let path = session.resolve_path(&arg);
    match session.storage.entry(&path).await {
        Ok(Some(entry)) if !entry.is_dir => {}
        _ => {
            warn!("[{}] RETR target missing or not a file: {}", session.id, path);
            session.send_response("550 File not found.").await?;
            return Ok(());
        }
    }

    let offset = session.take_restart_offset();
    let storage = Arc::clone(&session.storage);
    let guard = session.locks.acquire_read(&path).await;
    let mut reader = match storage.read(&path, offset).await {
        Ok(reader) => reader,
        Err(e) => {
            warn!("[{}] Could not open {}: {}", session.id, path, e);
            drop(guard);
            session.send_response("550 File not found.").await?;
            return Ok(());
        }
    };

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

    let copy = async {
        let mut encoder = AsciiEncoder::new();
        let mut buffer = vec![0u8; DATA_BUFFER_SIZE];
        let mut total: u64 = 0;
        loop {
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            if ascii {
                data.write_all(&encoder.encode(&buffer[..n])).await?;
            } else {
                data.write_all(&buffer[..n]).await?;
            }
            total += n as u64;
            limiter.throttle(n).await;
        }
        data.shutdown().await?;
        Ok::<u64, std::io::Error>(total)
    };

    let result = if transfer_timeout > 0 {
        match timeout(Duration::from_secs(transfer_timeout), copy).await {
            Ok(result) => result,
            Err(_) => {
                drop(guard);
                return Err(FtpError::Timeout);
            }
        }
    } else {
        copy.await
    };
    drop(guard);

    match result {
        Ok(total) => {
            info!("[{}] Sent {} bytes of {}", session.id, total, path);
            session.send_response("226 Transfer complete.").await?;
        }
        Err(e) => {
            warn!("[{}] Transfer of {} aborted: {}", session.id, path, e);
            session
                .send_response("425 Data connection failed; transfer aborted.")
                .await?;
        }
    }
    Ok(())
}
