use crate::core_error::FtpError;
use crate::session::Session;
use log::{info, warn};

/// Handles the DELE (Delete File) FTP command.
pub async fn handle_dele_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let path = session.resolve_path(&arg);

    match session.storage.entry(&path).await {
        Ok(Some(entry)) if !entry.is_dir => {}
        Ok(Some(_)) => {
            warn!("[{}] DELE target is a directory: {}", session.id, path);
            session
                .send_response("550 Not a regular file.")
                .await?;
            return Ok(());
        }
        _ => {
            session.send_response("550 File does not exist.").await?;
            return Ok(());
        }
    }

    let _guard = session.locks.acquire_write(&path).await;
    match session.storage.delete(&path, false).await {
        Ok(()) => {
            info!("[{}] File deleted: {}", session.id, path);
            session.send_response("250 File deleted.").await?;
        }
        Err(e) => {
            warn!("[{}] DELE failed for {}: {}", session.id, path, e);
            session.send_response("550 Failed to delete file.").await?;
        }
    }
    Ok(())
}
