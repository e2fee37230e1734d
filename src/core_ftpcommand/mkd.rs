use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::quote_path;
use crate::core_storage::StorageError;
use crate::session::Session;
use log::{info, warn};

/// Handles the MKD (Make Directory) FTP command.
pub async fn handle_mkd_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let path = session.resolve_path(&arg);

    match session.storage.create_dir(&path).await {
        Ok(()) => {
            info!("[{}] Directory created: {}", session.id, path);
            let response = format!("257 {} directory created.", quote_path(&path));
            session.send_response(&response).await?;
        }
        Err(StorageError::AlreadyExists(_)) => {
            warn!("[{}] MKD target already exists: {}", session.id, path);
            session
                .send_response("550 Directory already exists.")
                .await?;
        }
        Err(e) => {
            warn!("[{}] MKD failed for {}: {}", session.id, path, e);
            session
                .send_response("550 Failed to create directory.")
                .await?;
        }
    }
    Ok(())
}
