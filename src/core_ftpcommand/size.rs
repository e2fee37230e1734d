use crate::core_error::FtpError;
use crate::session::Session;
use log::warn;

/// Handles the SIZE FTP command, reporting a file's byte length.
pub async fn handle_size_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let path = session.resolve_path(&arg);

    match session.storage.size(&path).await {
        Ok(size) => {
            session.send_response(&format!("213 {}", size)).await?;
        }
        Err(e) => {
            warn!("[{}] SIZE failed for {}: {}", session.id, path, e);
            let response = FtpError::from(e).to_ftp_response();
            session.send_response(&response).await?;
        }
    }
    Ok(())
}
