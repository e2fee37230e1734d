use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::format_list_line;
use crate::session::Session;
use log::{info, warn};
use tokio::io::AsyncWriteExt;

/// Handles the LIST FTP command, streaming a Unix-style listing of the
/// target directory over the data connection.
pub async fn handle_list_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    if !session.is_authenticated {
        let response = FtpError::Auth.to_ftp_response();
        session.send_response(&response).await?;
        return Ok(());
    }

    let path = session.resolve_path(&arg);
    let entries = match session.storage.list_dir(&path).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("[{}] LIST of {} failed: {}", session.id, path, e);
            session
                .send_response("550 Failed to list directory.")
                .await?;
            return Ok(());
        }
    };

    session
        .send_response("150 Opening ASCII mode data connection for file list.")
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

    let send = async {
        for entry in &entries {
            let line = format!("{}\r\n", format_list_line(entry));
            data.write_all(line.as_bytes()).await?;
        }
        data.shutdown().await?;
        Ok::<(), std::io::Error>(())
    };

    match send.await {
        Ok(()) => {
            info!("[{}] Listed {} entries of {}", session.id, entries.len(), path);
            session.send_response("226 Transfer complete.").await?;
        }
        Err(e) => {
            warn!("[{}] LIST transfer aborted: {}", session.id, e);
            session
                .send_response("425 Data connection failed; transfer aborted.")
                .await?;
        }
    }
    Ok(())
}
