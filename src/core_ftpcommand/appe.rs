use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::receive_into_storage;
use crate::core_storage::WriteMode;
use crate::session::Session;
use log::warn;

/// Handles the APPE (Append) FTP command.
///
/// Without a pending restart offset the upload extends the file; with one,
/// existing content is first cut back to that offset.
pub async fn handle_appe_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    if arg.trim().is_empty() {
        session
            .send_response("501 Syntax error in parameters or arguments.")
            .await?;
        return Ok(());
    }

    let path = session.resolve_path(&arg);
    if let Ok(Some(entry)) = session.storage.entry(&path).await {
        if entry.is_dir {
            warn!("[{}] APPE target is a directory: {}", session.id, path);
            session
                .send_response("550 Target is a directory.")
                .await?;
            return Ok(());
        }
    }

    let offset = session.take_restart_offset();
    let mode = if offset > 0 {
        WriteMode::TruncateAt(offset)
    } else {
        WriteMode::Append
    };
    receive_into_storage(session, &path, mode).await
}
