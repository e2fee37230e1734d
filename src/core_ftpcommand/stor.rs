use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::receive_into_storage;
use crate::core_storage::WriteMode;
use crate::session::Session;
use log::warn;

/// Handles the STOR (Store File) FTP command.
///
/// A pending restart offset truncates the existing content to that offset
/// before the uploaded bytes are appended; otherwise the file is replaced.
pub async fn handle_stor_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    if arg.trim().is_empty() {
        warn!("[{}] STOR command received with no arguments", session.id);
        session
            .send_response("501 Syntax error in parameters or arguments.")
            .await?;
        return Ok(());
    }

    let path = session.resolve_path(&arg);
    if let Ok(Some(entry)) = session.storage.entry(&path).await {
        if entry.is_dir {
            warn!("[{}] STOR target is a directory: {}", session.id, path);
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
        WriteMode::Truncate
    };
    receive_into_storage(session, &path, mode).await
}
