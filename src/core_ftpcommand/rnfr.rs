use crate::core_error::FtpError;
use crate::session::Session;
use log::{info, warn};

/// Handles the RNFR (Rename From) FTP command.
///
/// Records the rename source for the RNTO that must follow.
pub async fn handle_rnfr_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let path = session.resolve_path(&arg);

    match session.storage.exists(&path).await {
        Ok(true) => {
            info!("[{}] Rename source set: {}", session.id, path);
            session.rename_from = Some(path);
            session.send_response("350 Ready for RNTO.").await?;
        }
        _ => {
            warn!("[{}] RNFR target missing: {}", session.id, path);
            session
                .send_response("550 File or directory does not exist.")
                .await?;
        }
    }
    Ok(())
}
