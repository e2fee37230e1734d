use crate::core_error::FtpError;
use crate::session::Session;
use log::{info, warn};

/// Handles the RNTO (Rename To) FTP command.
///
/// Consumes the source recorded by RNFR and performs the rename with both
/// paths exclusively locked, so no other session can touch either side
/// mid-move.
pub async fn handle_rnto_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let from = match session.rename_from.take() {
        Some(path) => path,
        None => {
            warn!("[{}] RNTO without a pending RNFR", session.id);
            let response = FtpError::Sequence.to_ftp_response();
            session.send_response(&response).await?;
            return Ok(());
        }
    };
    let to = session.resolve_path(&arg);

    let _guards = session.locks.acquire_write_many(&[&from, &to]).await;
    match session.storage.rename(&from, &to).await {
        Ok(()) => {
            info!("[{}] Renamed {} -> {}", session.id, from, to);
            session
                .send_response("250 File or directory renamed successfully.")
                .await?;
        }
        Err(e) => {
            warn!("[{}] Rename {} -> {} failed: {}", session.id, from, to, e);
            session
                .send_response("550 Failed to rename file or directory.")
                .await?;
        }
    }
    Ok(())
}
